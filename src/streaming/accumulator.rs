//! Cross-chunk accumulation of fragmented function calls.

use crate::types::FunctionCall;

/// Stream-scoped state reconstructing multi-call function invocations from
/// fragmented tool-call deltas.
///
/// Vendors stream function calls as a sequence of fragments, each tagged
/// with a call index. Within one stream those indices are non-decreasing: a
/// fragment either continues the current call or opens a strictly
/// higher-indexed one. The accumulator keeps one argument buffer and one
/// name per opened call, in index order.
///
/// A fragment whose index is lower than the current one is ignored and
/// leaves prior buffers intact. Revisiting a lower index would be a
/// protocol violation on the vendor's side; if a vendor is ever found to do
/// this legitimately, this policy needs revisiting rather than silent
/// corruption of already-closed buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionCallsAccumulator {
    /// Index of the call currently receiving fragments.
    index: Option<u32>,
    /// Vendor-supplied call ids, one slot per opened call.
    ids: Vec<Option<String>>,
    /// Call names, parallel to `buffers`.
    names: Vec<String>,
    /// Argument fragment buffers, one per opened call.
    buffers: Vec<String>,
}

impl FunctionCallsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any call has been opened.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Index of the call currently receiving fragments, if any.
    pub fn current_index(&self) -> Option<u32> {
        self.index
    }

    /// Folds one tool-call fragment into the accumulator.
    ///
    /// A fragment at the current index appends its arguments to the active
    /// buffer (absent arguments append nothing). A fragment at a strictly
    /// higher index opens a new call, seeding name and buffer from the
    /// fragment (absent arguments seed an empty buffer). A fragment at a
    /// lower index is ignored.
    pub fn apply_fragment(
        mut self,
        index: u32,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) -> Self {
        match self.index {
            Some(current) if index < current => self,
            Some(current) if index == current => {
                if let Some(args) = arguments
                    && let Some(buffer) = self.buffers.last_mut()
                {
                    buffer.push_str(args);
                }
                // Some vendors send the id on a later fragment than the name.
                if let Some(slot) = self.ids.last_mut()
                    && slot.is_none()
                {
                    *slot = id.map(str::to_string);
                }
                self
            }
            _ => {
                self.index = Some(index);
                self.ids.push(id.map(str::to_string));
                self.names.push(name.unwrap_or_default().to_string());
                self.buffers.push(arguments.unwrap_or_default().to_string());
                self
            }
        }
    }

    /// Builds the completed calls, one per opened call in index order.
    ///
    /// A call with an empty argument buffer still yields a [`FunctionCall`]
    /// with empty-string arguments; some vendors never send arguments for
    /// no-arg calls. Calls whose id the vendor never supplied get a
    /// generated one.
    pub fn finalize(self) -> Vec<FunctionCall> {
        self.ids
            .into_iter()
            .zip(self.names)
            .zip(self.buffers)
            .map(|((id, name), arguments)| FunctionCall {
                id: id.unwrap_or_else(FunctionCall::generate_id),
                name,
                arguments,
            })
            .collect()
    }
}
