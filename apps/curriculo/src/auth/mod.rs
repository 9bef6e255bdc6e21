pub mod linkedin;

pub use linkedin::{LinkedInClient, LinkedInProfile, OAuthError, STATE_COOKIE};
