//! The evaluation scratchpad carried through one program run.

use crate::config::{MAX_CHILDREN, MAX_INPUTS, MAX_MEMORY, MAX_OUTPUTS};

const ARG_STACK_SIZE: usize = MAX_CHILDREN * 4;

/// Per-run execution state for [`crate::interpreter::execute_program`].
///
/// A `Context` is caller-owned: the engine creates a fresh one for every
/// program it evaluates, so one program never observes another's leftover
/// `memory`. `memory` is the sole channel for state across successive calls
/// of the *same* `Context` — the engine never clears it on its own, so a
/// caller that wants the "running accumulator" behaviour gets it by holding
/// onto and reusing one `Context` itself, as in `execute_program`'s direct
/// callers outside `evolve_generation`.
#[derive(Debug, Clone)]
pub struct Context {
    pub inputs: [i32; MAX_INPUTS],
    pub num_inputs: usize,
    pub outputs: [i32; MAX_OUTPUTS],
    pub num_outputs: usize,
    pub memory: [i32; MAX_MEMORY],
    args: [i32; ARG_STACK_SIZE],
    arg_stack_ptr: usize,
    arg_frame_base: usize,
}

impl Context {
    pub fn new(num_inputs: usize) -> Self {
        Context {
            inputs: [0; MAX_INPUTS],
            num_inputs,
            outputs: [0; MAX_OUTPUTS],
            num_outputs: 0,
            memory: [0; MAX_MEMORY],
            args: [0; ARG_STACK_SIZE],
            arg_stack_ptr: 0,
            arg_frame_base: 0,
        }
    }

    pub fn with_inputs(inputs: &[i32]) -> Self {
        let mut ctx = Context::new(inputs.len());
        let n = inputs.len().min(MAX_INPUTS);
        ctx.inputs[..n].copy_from_slice(&inputs[..n]);
        ctx.num_inputs = n;
        ctx
    }

    pub fn input(&self, index: i32) -> i32 {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.num_inputs)
            .map(|i| self.inputs[i])
            .unwrap_or(0)
    }

    pub fn mem_read(&self, slot: i32) -> i32 {
        usize::try_from(slot)
            .ok()
            .filter(|&i| i < MAX_MEMORY)
            .map(|i| self.memory[i])
            .unwrap_or(0)
    }

    pub fn mem_write(&mut self, slot: i32, value: i32) {
        if let Ok(i) = usize::try_from(slot) {
            if i < MAX_MEMORY {
                self.memory[i] = value;
            }
        }
    }

    pub fn push_output(&mut self, value: i32) {
        if self.num_outputs < MAX_OUTPUTS {
            self.outputs[self.num_outputs] = value;
            self.num_outputs += 1;
        }
    }

    /// Resets the output buffer at the start of a run; `memory` and `inputs` are
    /// left untouched so a reused `Context` keeps its persistent state.
    pub fn reset_outputs(&mut self) {
        self.num_outputs = 0;
    }

    /// Pushes `args` as a new call frame, moving the frame base to just past the
    /// previous frame's top, and returns the `(saved_ptr, saved_base)` needed to
    /// restore the caller's frame on return. Arguments beyond the stack's capacity
    /// are silently dropped — an overflowing call degrades to missing parameters
    /// (which `param` already resolves to `0`) rather than panicking.
    pub fn push_frame(&mut self, args: &[i32]) -> (usize, usize) {
        let saved = (self.arg_stack_ptr, self.arg_frame_base);
        self.arg_frame_base = self.arg_stack_ptr;
        for &arg in args {
            if self.arg_stack_ptr < ARG_STACK_SIZE {
                self.args[self.arg_stack_ptr] = arg;
                self.arg_stack_ptr += 1;
            }
        }
        saved
    }

    pub fn pop_frame(&mut self, saved: (usize, usize)) {
        (self.arg_stack_ptr, self.arg_frame_base) = saved;
    }

    pub fn param(&self, index: i32) -> i32 {
        usize::try_from(index)
            .ok()
            .map(|i| self.arg_frame_base + i)
            .filter(|&slot| slot < self.arg_stack_ptr)
            .map(|slot| self.args[slot])
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_degrade_to_zero() {
        let ctx = Context::new(2);
        assert_eq!(ctx.input(-1), 0);
        assert_eq!(ctx.input(5), 0);
        assert_eq!(ctx.mem_read(100), 0);
        assert_eq!(ctx.param(0), 0);
    }

    #[test]
    fn output_buffer_caps_at_max_outputs() {
        let mut ctx = Context::new(0);
        for i in 0..(MAX_OUTPUTS + 3) {
            ctx.push_output(i as i32);
        }
        assert_eq!(ctx.num_outputs, MAX_OUTPUTS);
        assert_eq!(ctx.outputs[0], 0);
    }

    #[test]
    fn frame_push_pop_restores_and_resolves_params() {
        let mut ctx = Context::new(0);
        let saved = ctx.push_frame(&[5, 7]);
        assert_eq!(ctx.param(0), 5);
        assert_eq!(ctx.param(1), 7);
        assert_eq!(ctx.param(2), 0);

        let inner_saved = ctx.push_frame(&[1]);
        assert_eq!(ctx.param(0), 1);
        ctx.pop_frame(inner_saved);

        assert_eq!(ctx.param(0), 5);
        ctx.pop_frame(saved);
    }

    #[test]
    fn memory_persists_across_resets() {
        let mut ctx = Context::new(0);
        ctx.mem_write(0, 42);
        ctx.reset_outputs();
        assert_eq!(ctx.mem_read(0), 42);
    }
}
