use std::path::PathBuf;

use crate::stripe::StripeClient;

#[derive(Clone, Debug)]
pub struct AppState {
    pub stripe: StripeClient,
    pub static_dir: PathBuf,
}
