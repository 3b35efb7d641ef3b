use thiserror::Error;

pub type Result<T> = std::result::Result<T, GdetError>;

#[derive(Error, Debug)]
pub enum GdetError {
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Repository not found: {0}")]
    NotFound(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Signature time error: {0}")]
    SignatureTime(#[from] Box<gix::date::parse::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::with_conversion::Error> for GdetError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        GdetError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for GdetError {
    fn from(err: gix::objs::decode::Error) -> Self {
        GdetError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for GdetError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        GdetError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for GdetError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        GdetError::HeadPeel(Box::new(err))
    }
}

impl From<gix::date::parse::Error> for GdetError {
    fn from(err: gix::date::parse::Error) -> Self {
        GdetError::SignatureTime(Box::new(err))
    }
}
