mod config;
mod transfer;
