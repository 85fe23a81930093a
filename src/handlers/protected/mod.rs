// handlers/protected/mod.rs - handlers behind the bearer-token gate
//
// Every handler here takes a `Principal` argument; ownership and role checks
// happen in the services, which receive it explicitly.
pub mod comments;
pub mod hot_places;
pub mod posts;
pub mod recruitments;
pub mod users;
