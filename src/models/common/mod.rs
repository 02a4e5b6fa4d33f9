pub mod de;
pub mod pagination;
pub mod response;
