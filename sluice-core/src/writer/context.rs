use crate::Value;

/// Mutable state threaded through a single compilation.
///
/// `counter` is the number of parameters bound so far, a dialect numbering its
/// placeholders (`$1`, `$2`, ...) reads it before the value is bound.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Context {
    pub counter: u32,
    params: Vec<Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn bind(&mut self, value: Value) {
        self.counter += 1;
        self.params.push(value);
    }
    /// Parameters bound so far, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }
    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}
