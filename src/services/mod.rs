pub mod body_service;
pub mod comment_service;
pub mod filename_service;
pub mod store_service;
pub mod validation_service;

pub use body_service::process_body;
pub use comment_service::CommentService;
pub use filename_service::FilenameBuilder;
pub use store_service::CommentStore;
pub use validation_service::CommentValidator;
