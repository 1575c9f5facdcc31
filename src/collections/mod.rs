//! # Collection of Basic Data Structures
//!
//! This module contains the following submodules:
//!
//! - `linked_list`: Linked list implementation with arena-based storage.
//! - `storage`: Arena-based storage to deal with linked data structures.

pub mod linked_list;
pub mod storage;
