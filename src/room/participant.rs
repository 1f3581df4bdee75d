use serde::Serialize;

use crate::drawing::Point;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub display_name: String,
    pub cursor: Point,
}

impl Participant {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            cursor: Point::default(),
        }
    }

    pub fn move_cursor(&mut self, position: Point) {
        self.cursor = position;
    }
}
