//! Data-synchronization core for the student management dashboard.
//!
//! This crate owns everything between the UI and the outside world: the
//! roster and conversation stores that hold dashboard state, the REST
//! gateway that talks to the hosted student database, the inference
//! client behind the AI assistant, and the file-backed key/value store
//! used for chat history. The UI layer is responsible only for calling
//! store operations and rendering the snapshots they expose.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Roster and conversation state containers and their operations |
//! | [`gateway`] | REST data gateway for students, courses, and enrollments |
//! | [`llm`] | Text-generation client for the AI assistant |
//! | [`persist`] | File-backed JSON key/value store |

pub mod gateway;
pub mod llm;
pub mod persist;
pub mod store;
