use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoctrendError>;

#[derive(Error, Debug)]
pub enum LoctrendError {
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Metrics tool error: {0}")]
    Tool(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Tree traversal error: {0}")]
    TreeTraverse(#[from] Box<gix::traverse::tree::breadthfirst::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::Error> for LoctrendError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        LoctrendError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for LoctrendError {
    fn from(err: gix::object::commit::Error) -> Self {
        LoctrendError::Commit(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for LoctrendError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        LoctrendError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for LoctrendError {
    fn from(err: gix::objs::decode::Error) -> Self {
        LoctrendError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::traverse::tree::breadthfirst::Error> for LoctrendError {
    fn from(err: gix::traverse::tree::breadthfirst::Error) -> Self {
        LoctrendError::TreeTraverse(Box::new(err))
    }
}

impl From<gix::discover::Error> for LoctrendError {
    fn from(err: gix::discover::Error) -> Self {
        LoctrendError::GitDiscover(Box::new(err))
    }
}
