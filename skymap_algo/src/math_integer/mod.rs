pub mod circular;
pub mod counter;
pub mod fifo_buffer;
