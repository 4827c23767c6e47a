mod common;
mod share;
