mod handlers;
mod model;
mod routes;

pub use model::{CreateNote, DeleteNoteResponse, UpdateNote};
pub use routes::router;
