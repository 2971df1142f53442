//! HTTP adapter for the Duel Chess engine

pub mod api;
