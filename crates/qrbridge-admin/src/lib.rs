//! Admin data layer of the link service.
//!
//! [`AdminService`] issues the create/update/delete operations against the
//! store, [`AdminConsole`] keeps a read-through snapshot of both tables that
//! is re-fetched after every successful mutation, and [`view`] projects a
//! snapshot into the folder and table views.

pub mod console;
pub mod error;
pub mod params;
pub mod service;
pub mod view;

pub use console::{AdminConsole, Snapshot};
pub use error::{AdminError, Result};
pub use params::{
    CreateGroupParams, CreateMappingParams, GroupDeletion, GroupImage, UpdateMappingParams,
};
pub use service::{AdminService, AdminSettings};
pub use view::{Folder, GroupFilter, MappingFilter};
