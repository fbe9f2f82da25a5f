// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#![no_std]

pub mod board;
pub mod pinout;
pub mod timer;

pub use board::Board;
pub use timer::{CoarseTick, FineTick};
