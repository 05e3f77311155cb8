use std::sync::Arc;

use crate::application::books::BookService;
use crate::application::repos::HealthRepo;

#[derive(Clone)]
pub struct ApiState {
    pub books: Arc<BookService>,
    pub health: Arc<dyn HealthRepo>,
}
