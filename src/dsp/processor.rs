//! Processor trait definition
//!
//! Shared per-sample interface for the stateful primitives.

/// Base trait for stateful per-sample processors
///
/// One instance holds the state for exactly one channel. Samples must be fed
/// in strict time order; the recurrences are order dependent.
pub trait Processor: Send {
    /// Process one sample, advancing internal state
    fn process_sample(&mut self, input: f32) -> f32;

    /// Process a buffer in place, one sample at a time in order
    fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset processor state
    ///
    /// Clears filter taps, envelopes and delay lines. Parameters are kept.
    fn reset(&mut self);

    /// Get the processor type identifier
    fn effect_type(&self) -> &'static str;
}
