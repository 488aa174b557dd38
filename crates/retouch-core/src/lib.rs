pub mod error;
pub mod consts;
pub mod config;
pub mod geometry;
pub mod source;
pub mod state;
pub mod render;
pub mod controller;
pub mod history;
pub mod action;
pub mod session;
pub mod editor;
pub mod export;
pub mod boundary;
