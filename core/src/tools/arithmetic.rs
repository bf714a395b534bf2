use crate::tools::extract_number_arg;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;

pub const MISSING_ARGS_MESSAGE: &str = "❌ Error: please provide two numbers.";

/// The calculator's operations, keyed by tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arithmetic {
    Add,
    Sub,
}

impl Arithmetic {
    pub const ALL: [Arithmetic; 2] = [Arithmetic::Add, Arithmetic::Sub];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
        }
    }

    fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
        }
    }

    /// Runs the operation on `{a, b}`. Absent, null or non-numeric operands
    /// produce the missing-argument result instead of a number.
    pub fn call(self, args: &serde_json::Value) -> ToolResult {
        let (Some(a), Some(b)) = (extract_number_arg(args, "a"), extract_number_arg(args, "b"))
        else {
            return ToolResult::error(MISSING_ARGS_MESSAGE);
        };

        let result = self.apply(a, b);
        ToolResult::success(format!(
            "✅ Result: {} {} {} = {}",
            a,
            self.symbol(),
            b,
            result
        ))
    }
}

#[async_trait]
impl Tool for Arithmetic {
    fn name(&self) -> &str {
        Arithmetic::name(*self)
    }

    fn description(&self) -> &str {
        match self {
            Self::Add => "Add two numbers.",
            Self::Sub => "Subtract b from a.",
        }
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "number",
                    "description": "First operand"
                },
                "b": {
                    "type": "number",
                    "description": "Second operand"
                }
            },
            "required": ["a", "b"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> ToolResult {
        self.call(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_states_operands_and_sum() {
        let result = Arithmetic::Add.call(&json!({"a": 5, "b": 3}));
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.text(), "✅ Result: 5 + 3 = 8");
    }

    #[test]
    fn sub_states_operands_and_difference() {
        let result = Arithmetic::Sub.call(&json!({"a": 10, "b": 4}));
        let text = result.text();
        assert!(text.contains("10"));
        assert!(text.contains('4'));
        assert!(text.contains('6'));
        assert_eq!(text, "✅ Result: 10 - 4 = 6");
    }

    #[test]
    fn fractional_and_negative_operands() {
        assert_eq!(
            Arithmetic::Add.call(&json!({"a": 2.5, "b": -1})).text(),
            "✅ Result: 2.5 + -1 = 1.5"
        );
        assert_eq!(
            Arithmetic::Sub.call(&json!({"a": 0.5, "b": 2})).text(),
            "✅ Result: 0.5 - 2 = -1.5"
        );
    }

    #[test]
    fn results_follow_float_semantics() {
        let pairs = [(0.1, 0.2), (1e308, 1e308), (-3.0, 3.0), (7.0, 0.0)];
        for (a, b) in pairs {
            let add = Arithmetic::Add.call(&json!({"a": a, "b": b})).text();
            let sub = Arithmetic::Sub.call(&json!({"a": a, "b": b})).text();
            assert!(add.ends_with(&format!("= {}", a + b)), "{add}");
            assert!(sub.ends_with(&format!("= {}", a - b)), "{sub}");
        }
    }

    #[test]
    fn missing_operand_yields_fixed_error() {
        for op in Arithmetic::ALL {
            for args in [
                json!({"a": 5}),
                json!({"b": 5}),
                json!({}),
                json!({"a": null, "b": 1}),
                json!({"a": "5", "b": 1}),
            ] {
                let result = op.call(&args);
                assert!(result.is_error);
                assert_eq!(result.text(), MISSING_ARGS_MESSAGE);
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(Arithmetic::from_name("add"), Some(Arithmetic::Add));
        assert_eq!(Arithmetic::from_name("sub"), Some(Arithmetic::Sub));
        assert_eq!(Arithmetic::from_name("mul"), None);
    }

    #[tokio::test]
    async fn execute_goes_through_tool_trait() {
        let tool: &dyn Tool = &Arithmetic::Add;
        let result = tool.execute(&json!({"a": 1, "b": 2})).await;
        assert_eq!(result.text(), "✅ Result: 1 + 2 = 3");
        assert_eq!(tool.spec().parameters_schema["required"], json!(["a", "b"]));
    }
}
