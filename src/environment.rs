use crate::parser::{FunctionDefinition, Signature};
use std::collections::BTreeMap;

/// Variable bindings. Reading a name that was never assigned binds it to 0,
/// so lookups cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    values: BTreeMap<String, i64>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            values: BTreeMap::new(),
        }
    }

    pub fn lookup(&mut self, name: &str) -> i64 {
        if let Some(value) = self.values.get(name) {
            return *value;
        }
        self.values.insert(name.to_string(), 0);
        0
    }

    /// Reads without the auto-creating side effect.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn assign(&mut self, name: &str, value: i64) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "None");
        }
        for (name, value) in self.iter() {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

/// Process-wide function definitions, keyed by name. Calls resolve through
/// this table at evaluation time, which is what makes recursion work.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: BTreeMap<String, FunctionDefinition>,
}

impl FunctionTable {
    pub fn new() -> FunctionTable {
        FunctionTable {
            functions: BTreeMap::new(),
        }
    }

    /// Registers a definition. A function that already exists keeps its
    /// entry and gets the new parameters and body.
    pub fn define(&mut self, definition: FunctionDefinition) -> Signature {
        let signature = definition.signature();
        match self.functions.get_mut(definition.name()) {
            Some(existing) => *existing = definition,
            None => {
                self.functions
                    .insert(definition.name().to_string(), definition);
            }
        }
        signature
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn signatures(&self) -> impl Iterator<Item = Signature> + '_ {
        self.functions.values().map(FunctionDefinition::signature)
    }
}

impl std::fmt::Display for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "None");
        }
        for signature in self.signatures() {
            writeln!(f, "{signature}")?;
        }
        Ok(())
    }
}
