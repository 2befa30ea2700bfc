mod storage;
mod store;

pub use storage::{clear_session, get_session_path, load_session, save_session, SessionSnapshot};
pub use store::{ParameterState, ParameterStore};
