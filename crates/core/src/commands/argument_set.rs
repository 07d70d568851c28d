use crate::commands::{
    error::{CommandResult, InternalError},
    value::{BlockPos, ColumnPos, Location, PlayerSelector, Value, Vec3},
};
use rustc_hash::FxHashMap;

/// Parsed values keyed by their semantic key. Two nodes may share a key; the later write wins.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSet {
    args: FxHashMap<String, Value>,
}

impl ArgumentSet {
    pub(super) fn insert(&mut self, key: &str, value: Value) {
        self.args.insert(key.to_string(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.args.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn get(&self, key: &str) -> CommandResult<&Value> {
        self.args.get(key).ok_or_else(|| {
            InternalError::MissingArgument {
                name: key.to_string(),
            }
            .into()
        })
    }

    pub fn get_string(&self, key: &str) -> CommandResult<String> {
        Ok(self.get(key)?.as_string()?.clone())
    }

    pub fn get_integer(&self, key: &str) -> CommandResult<i32> {
        self.get(key)?.as_integer()
    }

    pub fn get_float(&self, key: &str) -> CommandResult<f32> {
        self.get(key)?.as_float()
    }

    pub fn get_double(&self, key: &str) -> CommandResult<f64> {
        self.get(key)?.as_double()
    }

    pub fn get_boolean(&self, key: &str) -> CommandResult<bool> {
        self.get(key)?.as_boolean()
    }

    pub fn get_player(&self, key: &str) -> CommandResult<PlayerSelector> {
        Ok(self.get(key)?.as_player()?.clone())
    }

    pub fn get_vec3(&self, key: &str) -> CommandResult<Vec3> {
        self.get(key)?.as_vec3()
    }

    pub fn get_column_pos(&self, key: &str) -> CommandResult<ColumnPos> {
        self.get(key)?.as_column_pos()
    }

    pub fn get_block_pos(&self, key: &str) -> CommandResult<BlockPos> {
        self.get(key)?.as_block_pos()
    }

    pub fn get_resource_location(&self, key: &str) -> CommandResult<String> {
        Ok(self.get(key)?.as_resource_location()?.clone())
    }

    pub fn get_location(&self, key: &str) -> CommandResult<Location> {
        Ok(self.get(key)?.as_location()?.clone())
    }

    pub fn get_greedy(&self, key: &str) -> CommandResult<String> {
        Ok(self.get(key)?.as_greedy()?.clone())
    }
}
