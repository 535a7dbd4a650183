mod data;

pub(crate) use data::DataHandler;
