mod common;

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::Result;

#[test]
fn supervised_child_stops_with_its_watched_process() -> Result<()> {
    let mut watched = Command::new("sleep").arg("0.2").spawn()?;
    let watched_pid = watched.id();

    let mut guard = common::supervised(watched_pid, "sleep", &["30"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Reap it so the pid stops answering signals
    watched.wait()?;

    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if guard.try_wait()?.is_some() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    guard.kill()?;
    anyhow::bail!("supervised command outlived the process it watched")
}

#[test]
fn watchdog_exits_when_its_command_finishes_first() -> Result<()> {
    let mut guard = common::supervised(std::process::id(), "true", &[])
        .stdout(Stdio::null())
        .spawn()?;

    // This process is still alive, so only the command ending can stop it
    let status = guard.wait()?;
    assert!(status.code().is_some());
    Ok(())
}
