/*!
The [`Empty`] type.

An [`Empty`] stands in where no meaningful implementation is wanted. As a
[`crate::clock::Clock`] it never produces a reading, which makes it useful for
exercising the failure path of time-dependent code.
*/

/**
A type that behaves like a default, empty, null value.
*/
#[derive(Default, Debug, Clone, Copy)]
pub struct Empty;
