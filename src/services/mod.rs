// src/services/mod.rs
//
// Domain operations. Each public function is one unit of work: it opens a
// transaction, loads what it needs, checks permissions and input, writes,
// and commits. Nothing is cached between calls.

pub mod account;
pub mod comments;
pub mod likes;
pub mod posts;
pub mod seed;
