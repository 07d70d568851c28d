use crate::commands::{
    error::{SyntaxError, SyntaxErrorKind},
    reader::StringReader,
    value::*,
};
use std::fmt::Display;

pub type ArgumentParseResult = Result<Option<Value>, SyntaxError>;

const MAX_PLAYER_NAME_LENGTH: usize = 16;

fn check_range<T: PartialOrd + Display>(
    reader: &StringReader<'_>,
    start: usize,
    kind: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<T, SyntaxError> {
    let kind_error = if value < min {
        SyntaxErrorKind::TooLow {
            kind,
            min: min.to_string(),
            found: value.to_string(),
        }
    } else if value > max {
        SyntaxErrorKind::TooHigh {
            kind,
            max: max.to_string(),
            found: value.to_string(),
        }
    } else {
        return Ok(value);
    };
    Err(SyntaxError::new(kind_error, reader.input(), start))
}

pub fn parse_word(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    let token = reader.read_token();
    if token.is_empty() {
        return Err(reader.error(SyntaxErrorKind::ExpectedWord));
    }
    Ok(Some(Value::String(token.to_string())))
}

pub fn parse_phrase(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    Ok(Some(Value::String(reader.read_string()?)))
}

pub fn parse_greedy_string(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    Ok(Some(Value::GreedyString(reader.read_remaining().to_string())))
}

pub fn parse_integer(reader: &mut StringReader<'_>, min: i32, max: i32) -> ArgumentParseResult {
    let start = reader.cursor();
    let value = reader.read_int()?;
    let value = check_range(reader, start, "Integer", value, min, max)?;
    Ok(Some(Value::Integer(value)))
}

pub fn parse_float(reader: &mut StringReader<'_>, min: f32, max: f32) -> ArgumentParseResult {
    let start = reader.cursor();
    let value = reader.read_float()?;
    let value = check_range(reader, start, "Float", value, min, max)?;
    Ok(Some(Value::Float(value)))
}

pub fn parse_double(reader: &mut StringReader<'_>, min: f64, max: f64) -> ArgumentParseResult {
    let start = reader.cursor();
    let value = reader.read_double()?;
    let value = check_range(reader, start, "Double", value, min, max)?;
    Ok(Some(Value::Double(value)))
}

pub fn parse_boolean(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    Ok(Some(Value::Boolean(reader.read_boolean()?)))
}

pub fn parse_player(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    let start = reader.cursor();
    let token = reader.read_token();

    let selector = match token {
        "" => return Err(reader.error(SyntaxErrorKind::ExpectedWord)),
        "@s" => PlayerSelector::Sender,
        "@p" => PlayerSelector::Nearest,
        "@a" => PlayerSelector::All,
        _ if token.starts_with('@') => {
            return Err(SyntaxError::new(
                SyntaxErrorKind::Invalid(format!("Unknown selector type '{}'", token)),
                reader.input(),
                start,
            ));
        }
        _ => {
            let valid = token.len() <= MAX_PLAYER_NAME_LENGTH
                && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::Invalid(format!("Invalid player name '{}'", token)),
                    reader.input(),
                    start,
                ));
            }
            PlayerSelector::Named(token.to_string())
        }
    };

    Ok(Some(Value::Player(selector)))
}

/// Reads `count` space separated coordinates, each optionally prefixed with `~`.
fn parse_coordinates<T>(
    reader: &mut StringReader<'_>,
    count: usize,
    invalid: fn(String) -> SyntaxErrorKind,
    zero: T,
) -> Result<Vec<RelativeCoord<T>>, SyntaxError>
where
    T: std::str::FromStr + Copy,
{
    let mut coords = Vec::with_capacity(count);

    for i in 0..count {
        if i > 0 {
            if reader.peek() != Some(' ') {
                return Err(reader.error(SyntaxErrorKind::IncompleteCoordinates(count)));
            }
            reader.skip();
        }

        let start = reader.cursor();
        let token = reader.read_token();
        if token.is_empty() {
            return Err(reader.error(SyntaxErrorKind::IncompleteCoordinates(count)));
        }

        let invalid_error =
            || SyntaxError::new(invalid(token.to_string()), reader.input(), start);
        let coord = if token == "~" {
            RelativeCoord::Relative(zero)
        } else if let Some(offset_str) = token.strip_prefix('~') {
            RelativeCoord::Relative(offset_str.parse::<T>().map_err(|_| invalid_error())?)
        } else {
            RelativeCoord::Absolute(token.parse::<T>().map_err(|_| invalid_error())?)
        };

        coords.push(coord);
    }

    Ok(coords)
}

fn read_vec3(reader: &mut StringReader<'_>) -> Result<Vec3, SyntaxError> {
    let coords = parse_coordinates(reader, 3, SyntaxErrorKind::InvalidDouble, 0.0f64)?;
    Ok(Vec3 {
        x: coords[0],
        y: coords[1],
        z: coords[2],
    })
}

pub fn parse_vec3(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    Ok(Some(Value::Vec3(read_vec3(reader)?)))
}

pub fn parse_column_pos(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    let coords = parse_coordinates(reader, 2, SyntaxErrorKind::InvalidInt, 0i32)?;
    Ok(Some(Value::ColumnPos(ColumnPos {
        x: coords[0],
        z: coords[1],
    })))
}

pub fn parse_block_pos(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    let start = reader.cursor();
    let coords = parse_coordinates(reader, 3, SyntaxErrorKind::InvalidInt, 0i32)?;
    let mut absolute = [0; 3];
    for (slot, coord) in absolute.iter_mut().zip(coords) {
        match coord {
            RelativeCoord::Absolute(value) => *slot = value,
            RelativeCoord::Relative(_) => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::Invalid("Block positions must be absolute".to_string()),
                    reader.input(),
                    start,
                ));
            }
        }
    }
    Ok(Some(Value::BlockPos(BlockPos::new(
        absolute[0],
        absolute[1],
        absolute[2],
    ))))
}

pub fn is_resource_location(token: &str) -> bool {
    let (namespace, path) = token.split_once(':').unwrap_or(("", token));
    !path.is_empty()
        && namespace
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
        && path
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
}

fn read_resource_location(reader: &mut StringReader<'_>) -> Result<String, SyntaxError> {
    let start = reader.cursor();
    let token = reader.read_token();
    if token.is_empty() {
        return Err(reader.error(SyntaxErrorKind::ExpectedWord));
    }
    if !is_resource_location(token) {
        return Err(SyntaxError::new(
            SyntaxErrorKind::Invalid(format!("Invalid resource location '{}'", token)),
            reader.input(),
            start,
        ));
    }
    Ok(token.to_string())
}

pub fn parse_resource_location(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    Ok(Some(Value::ResourceLocation(read_resource_location(
        reader,
    )?)))
}

pub fn parse_location(reader: &mut StringReader<'_>) -> ArgumentParseResult {
    let world = read_resource_location(reader)?;
    if reader.peek() != Some(' ') {
        return Err(reader.error(SyntaxErrorKind::IncompleteCoordinates(3)));
    }
    reader.skip();
    let position = read_vec3(reader)?;
    Ok(Some(Value::Location(Location { world, position })))
}

pub fn parse_choice(reader: &mut StringReader<'_>, options: &[String]) -> ArgumentParseResult {
    let start = reader.cursor();
    let token = reader.read_token();
    match options.iter().find(|option| option.eq_ignore_ascii_case(token)) {
        Some(option) => Ok(Some(Value::String(option.clone()))),
        None => Err(SyntaxError::new(
            SyntaxErrorKind::Invalid(format!(
                "Expected one of {}, found '{}'",
                options.join(", "),
                token
            )),
            reader.input(),
            start,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(
        f: impl Fn(&mut StringReader<'_>) -> ArgumentParseResult,
        input: &str,
    ) -> (ArgumentParseResult, usize) {
        let mut reader = StringReader::new(input);
        let result = f(&mut reader);
        (result, reader.cursor())
    }

    #[test]
    fn integer_range_is_enforced() {
        let (value, cursor) = parse(|r| parse_integer(r, 0, 10), "7 rest");
        assert_eq!(value, Ok(Some(Value::Integer(7))));
        assert_eq!(cursor, 1);

        let (value, _) = parse(|r| parse_integer(r, 0, 10), "11");
        let err = value.unwrap_err();
        assert!(matches!(err.kind, SyntaxErrorKind::TooHigh { .. }));
        assert_eq!(err.cursor(), 0);
    }

    #[test]
    fn vec3_accepts_relative_coordinates() {
        let (value, cursor) = parse(parse_vec3, "~ ~1.5 -3 tail");
        assert_eq!(
            value,
            Ok(Some(Value::Vec3(Vec3 {
                x: RelativeCoord::Relative(0.0),
                y: RelativeCoord::Relative(1.5),
                z: RelativeCoord::Absolute(-3.0),
            })))
        );
        assert_eq!(cursor, 9);
    }

    #[test]
    fn vec3_requires_three_coordinates() {
        let (value, _) = parse(parse_vec3, "1 2");
        assert_eq!(
            value.unwrap_err().kind,
            SyntaxErrorKind::IncompleteCoordinates(3)
        );
    }

    #[test]
    fn block_pos_rejects_relative() {
        let (value, _) = parse(parse_block_pos, "1 ~ 3");
        assert!(value.is_err());
        let (value, _) = parse(parse_block_pos, "1 64 -3");
        assert_eq!(value, Ok(Some(Value::BlockPos(BlockPos::new(1, 64, -3)))));
    }

    #[test]
    fn player_selectors() {
        assert_eq!(
            parse(parse_player, "Steve").0,
            Ok(Some(Value::Player(PlayerSelector::Named("Steve".to_string()))))
        );
        assert_eq!(
            parse(parse_player, "@a").0,
            Ok(Some(Value::Player(PlayerSelector::All)))
        );
        assert!(parse(parse_player, "@z").0.is_err());
        assert!(parse(parse_player, "not-a-name").0.is_err());
    }

    #[test]
    fn location_reads_world_and_position() {
        let (value, cursor) = parse(parse_location, "nether 1 2 3");
        let Ok(Some(Value::Location(location))) = value else {
            panic!("expected a location");
        };
        assert_eq!(location.world, "nether");
        assert_eq!(location.position.x, RelativeCoord::Absolute(1.0));
        assert_eq!(cursor, 12);
    }

    #[test]
    fn choice_is_case_insensitive() {
        let options = vec!["creative".to_string(), "survival".to_string()];
        assert_eq!(
            parse(|r| parse_choice(r, &options), "Creative").0,
            Ok(Some(Value::String("creative".to_string())))
        );
        assert!(parse(|r| parse_choice(r, &options), "adventure").0.is_err());
    }

    #[test]
    fn resource_locations() {
        assert!(is_resource_location("minecraft:overworld"));
        assert!(is_resource_location("the_end"));
        assert!(!is_resource_location("Nether"));
        assert!(!is_resource_location("ns:"));
    }
}
