pub mod attachments;
pub use attachments::{AttachmentError, AttachmentStore};

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, AuthUser, LoginResult};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod courses;
pub use courses::{CourseError, CourseService};

pub mod mailer;
pub use mailer::{LogMailer, MailError, Mailer, OutgoingMail, RelayMailer};
