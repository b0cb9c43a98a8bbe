//! # Repositories
//!
//! ```text
//! ProductRepository   list(filters, page) · get · create · update · delete
//! CategoryRepository  list · get · create · rename · delete (detaches products)
//! CartRepository      list · get · products · create · delete
//!                     add / remove / clear product · checkout
//! ```
//!
//! Row types and the product listing query builder live in [`query`].

pub mod cart;
pub mod category;
pub mod product;
pub mod query;
