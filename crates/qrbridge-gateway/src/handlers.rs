mod assets;
mod cron;
mod groups;
mod health;
mod mappings;
mod qr;
mod redirect;

pub use assets::{asset_handler, upload_handler};
pub use cron::keep_alive_handler;
pub use groups::{create_group_handler, delete_group_handler, folders_handler, list_groups_handler};
pub use health::health_handler;
pub use mappings::{
    create_mapping_handler, delete_mapping_handler, get_mapping_handler, list_mappings_handler,
    update_mapping_handler,
};
pub use qr::{qr_pdf_handler, qr_png_handler};
pub use redirect::{missing_link_handler, redirect_handler};
