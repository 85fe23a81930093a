pub mod attraction;
pub mod comment;
pub mod hot_place;
pub mod post;
pub mod recruitment;
pub mod user;

pub use attraction::AttractionInfo;
pub use comment::{Comment, CommentBody, CommentPatch, NewComment};
pub use hot_place::{HotPlace, HotPlacePatch, NewHotPlace};
pub use post::{NewPost, NoticeToggle, Post, PostPatch};
pub use recruitment::{JoinRefusal, NewRecruitment, Recruitment, RecruitmentPatch};
pub use user::{NewUser, PasswordReset, User, UserPatch};
