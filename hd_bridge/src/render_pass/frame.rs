/// Host-supplied frame record and rprim collection

use std::fmt;
use std::sync::{Arc, Mutex};
use crate::device::{CommandList, Image};

/// Per-invocation record the host delivers through the `CurrentFrame` setting
///
/// Only used in Direct mode. The command list is already reset and
/// recording; the host submits it and presents the backbuffer.
#[derive(Clone)]
pub struct Frame {
    pub command_list: Arc<Mutex<Box<dyn CommandList>>>,
    pub back_buffer: Arc<dyn Image>,
}

impl Frame {
    pub fn new(command_list: Arc<Mutex<Box<dyn CommandList>>>, back_buffer: Arc<dyn Image>) -> Self {
        Self { command_list, back_buffer }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.back_buffer.info();
        f.debug_struct("Frame")
            .field("back_buffer", &format_args!("{}x{} {:?}", info.width, info.height, info.format))
            .finish_non_exhaustive()
    }
}

/// Named set of rprims a render pass draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RprimCollection {
    pub name: String,
    pub repr: String,
}

impl RprimCollection {
    pub fn new(name: impl Into<String>, repr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repr: repr.into(),
        }
    }
}
