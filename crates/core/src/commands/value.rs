use crate::commands::{
    error::{CommandResult, InternalError},
    CommandSource,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelativeCoord<T> {
    Absolute(T),
    Relative(T),
}

impl<T> RelativeCoord<T>
where
    T: std::ops::Add<Output = T> + Copy,
{
    pub fn resolve(&self, reference: T) -> T {
        match self {
            RelativeCoord::Absolute(val) => *val,
            RelativeCoord::Relative(offset) => reference + *offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: RelativeCoord<f64>,
    pub y: RelativeCoord<f64>,
    pub z: RelativeCoord<f64>,
}

impl Vec3 {
    pub fn resolve(&self, reference: (f64, f64, f64)) -> (f64, f64, f64) {
        (
            self.x.resolve(reference.0),
            self.y.resolve(reference.1),
            self.z.resolve(reference.2),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnPos {
    pub x: RelativeCoord<i32>,
    pub z: RelativeCoord<i32>,
}

impl ColumnPos {
    pub fn resolve(&self, reference: (i32, i32)) -> (i32, i32) {
        (self.x.resolve(reference.0), self.z.resolve(reference.1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A named world plus a position inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub world: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerSelector {
    Named(String),
    /// `@s`
    Sender,
    /// `@p`
    Nearest,
    /// `@a`
    All,
}

impl PlayerSelector {
    /// Names the selector refers to, as seen by `source`.
    pub fn resolve(&self, source: &dyn CommandSource) -> Vec<String> {
        match self {
            PlayerSelector::Named(name) => vec![name.clone()],
            PlayerSelector::Sender => vec![source.name().to_string()],
            PlayerSelector::Nearest => source.online_players().into_iter().take(1).collect(),
            PlayerSelector::All => source.online_players(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i32),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Player(PlayerSelector),
    Vec3(Vec3),
    ColumnPos(ColumnPos),
    BlockPos(BlockPos),
    ResourceLocation(String),
    Location(Location),
    GreedyString(String),
}

impl Value {
    fn type_error(&self, expected: &str) -> InternalError {
        InternalError::WrongArgumentType {
            name: format!("{:?}", self),
            expected: expected.to_string(),
        }
    }

    pub(super) fn as_string(&self) -> CommandResult<&String> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.type_error("String").into()),
        }
    }

    pub(super) fn as_integer(&self) -> CommandResult<i32> {
        match self {
            Value::Integer(i) => Ok(*i),
            _ => Err(self.type_error("Integer").into()),
        }
    }

    pub(super) fn as_float(&self) -> CommandResult<f32> {
        match self {
            Value::Float(f) => Ok(*f),
            _ => Err(self.type_error("Float").into()),
        }
    }

    pub(super) fn as_double(&self) -> CommandResult<f64> {
        match self {
            Value::Double(d) => Ok(*d),
            _ => Err(self.type_error("Double").into()),
        }
    }

    pub(super) fn as_boolean(&self) -> CommandResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(self.type_error("Boolean").into()),
        }
    }

    pub(super) fn as_player(&self) -> CommandResult<&PlayerSelector> {
        match self {
            Value::Player(p) => Ok(p),
            _ => Err(self.type_error("Player").into()),
        }
    }

    pub(super) fn as_vec3(&self) -> CommandResult<Vec3> {
        match self {
            Value::Vec3(v) => Ok(*v),
            _ => Err(self.type_error("Vec3").into()),
        }
    }

    pub(super) fn as_column_pos(&self) -> CommandResult<ColumnPos> {
        match self {
            Value::ColumnPos(p) => Ok(*p),
            _ => Err(self.type_error("ColumnPos").into()),
        }
    }

    pub(super) fn as_block_pos(&self) -> CommandResult<BlockPos> {
        match self {
            Value::BlockPos(p) => Ok(*p),
            _ => Err(self.type_error("BlockPos").into()),
        }
    }

    pub(super) fn as_resource_location(&self) -> CommandResult<&String> {
        match self {
            Value::ResourceLocation(r) => Ok(r),
            _ => Err(self.type_error("ResourceLocation").into()),
        }
    }

    pub(super) fn as_location(&self) -> CommandResult<&Location> {
        match self {
            Value::Location(l) => Ok(l),
            _ => Err(self.type_error("Location").into()),
        }
    }

    pub(super) fn as_greedy(&self) -> CommandResult<&String> {
        match self {
            Value::GreedyString(s) => Ok(s),
            _ => Err(self.type_error("Greedy").into()),
        }
    }
}
