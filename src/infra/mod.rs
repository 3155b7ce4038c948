pub mod openaq;
