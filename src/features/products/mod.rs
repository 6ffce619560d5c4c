//! Product catalog feature.
//!
//! CRUD for catalog products with image upload to object storage. Mutating
//! operations keep the row store and the object store consistent through an
//! upload-then-persist ordering with a best-effort compensating delete.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/products` | List/search/paginate products |
//! | GET | `/api/products/{id}` | Get one product |
//! | POST | `/api/products` | Create product (multipart, image file required) |
//! | PUT | `/api/products/{id}` | Partial update (multipart) |
//! | DELETE | `/api/products/{id}` | Delete product and stored image |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ProductService;
