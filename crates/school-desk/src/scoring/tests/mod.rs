mod common;
mod scorer;
mod summary;
