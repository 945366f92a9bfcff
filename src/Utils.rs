/// Task documents: header sections with JSON bodies
pub mod load_from_file;
