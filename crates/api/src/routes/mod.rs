mod health;
mod scan;
mod static_files;

pub use health::health_router;
pub use scan::scan_router;
pub use static_files::static_router;
