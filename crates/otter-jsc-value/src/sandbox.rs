//! In-memory engine with an inspectable heap.
//!
//! `SandboxEngine` implements [`Engine`] over a slot heap with per-slot pin
//! counts and a stop-the-world mark/sweep collector. It follows the
//! engine's observable rules closely enough to drive the wrapper through
//! every coercion and exception path: objects can be frozen, properties can
//! throw on access, symbols refuse number and string conversion, and
//! `undefined`/`null` refuse object conversion.
//!
//! Every `protect`/`unprotect` call is logged so callers can check the pin
//! discipline of the code under test.

use std::cell::RefCell;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::engine::{Completion, Engine, EngineException, JsType};

/// Reference to a slot in the sandbox heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SandboxRef(u32);

impl SandboxRef {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A single pin operation, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectEvent {
    Protect(SandboxRef),
    Unprotect(SandboxRef),
}

#[derive(Debug, Clone)]
enum Property {
    Data(SandboxRef),
    /// Accessor whose getter and setter both throw a fresh error
    Throwing { error_name: String, message: String },
}

#[derive(Debug, Clone)]
enum ObjectClass {
    Plain,
    Array,
    RegExp { source: String, flags: String },
    Error,
    /// Wrapper object produced by coercing a primitive
    Boxed(SandboxRef),
}

#[derive(Debug, Clone)]
struct ObjectData {
    class: ObjectClass,
    properties: IndexMap<String, Property>,
    frozen: bool,
}

impl ObjectData {
    fn new(class: ObjectClass) -> Self {
        Self {
            class,
            properties: IndexMap::new(),
            frozen: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Symbol(String),
    Object(ObjectData),
}

#[derive(Debug)]
struct HeapCell {
    kind: Kind,
    pins: u32,
}

#[derive(Debug, Default)]
struct Heap {
    slots: Vec<Option<HeapCell>>,
    free: Vec<u32>,
}

impl Heap {
    fn alloc(&mut self, kind: Kind) -> SandboxRef {
        let cell = HeapCell { kind, pins: 0 };
        match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Some(cell);
                SandboxRef(index)
            }
            None => {
                self.slots.push(Some(cell));
                SandboxRef((self.slots.len() - 1) as u32)
            }
        }
    }

    fn cell(&self, r: SandboxRef) -> Option<&HeapCell> {
        self.slots.get(r.0 as usize).and_then(Option::as_ref)
    }

    fn cell_mut(&mut self, r: SandboxRef) -> Option<&mut HeapCell> {
        self.slots.get_mut(r.0 as usize).and_then(Option::as_mut)
    }

    fn object(&self, r: SandboxRef) -> Option<&ObjectData> {
        match self.cell(r).map(|cell| &cell.kind) {
            Some(Kind::Object(data)) => Some(data),
            _ => None,
        }
    }

    fn object_mut(&mut self, r: SandboxRef) -> Option<&mut ObjectData> {
        match self.cell_mut(r).map(|cell| &mut cell.kind) {
            Some(Kind::Object(data)) => Some(data),
            _ => None,
        }
    }

    fn number(&self, r: SandboxRef) -> Option<f64> {
        match self.cell(r).map(|cell| &cell.kind) {
            Some(Kind::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

/// In-memory JavaScript engine
#[derive(Debug)]
pub struct SandboxEngine {
    heap: RefCell<Heap>,
    protect_log: RefCell<Vec<ProtectEvent>>,
    undefined: SandboxRef,
    null: SandboxRef,
    true_value: SandboxRef,
    false_value: SandboxRef,
}

impl SandboxEngine {
    pub fn new() -> Self {
        let mut heap = Heap::default();
        let undefined = heap.alloc(Kind::Undefined);
        let null = heap.alloc(Kind::Null);
        let true_value = heap.alloc(Kind::Boolean(true));
        let false_value = heap.alloc(Kind::Boolean(false));

        Self {
            heap: RefCell::new(heap),
            protect_log: RefCell::new(Vec::new()),
            undefined,
            null,
            true_value,
            false_value,
        }
    }

    /// Current pin count of a value (0 once collected)
    pub fn protect_count(&self, value: SandboxRef) -> u32 {
        self.heap.borrow().cell(value).map_or(0, |cell| cell.pins)
    }

    /// Whether the slot still holds a value
    pub fn is_live(&self, value: SandboxRef) -> bool {
        self.heap.borrow().cell(value).is_some()
    }

    /// Number of occupied heap slots
    pub fn live_slots(&self) -> usize {
        self.heap.borrow().slots.iter().flatten().count()
    }

    /// Every protect/unprotect call since creation or the last clear
    pub fn protect_log(&self) -> Vec<ProtectEvent> {
        self.protect_log.borrow().clone()
    }

    pub fn clear_protect_log(&self) {
        self.protect_log.borrow_mut().clear();
    }

    pub fn make_symbol(&self, description: &str) -> SandboxRef {
        self.alloc(Kind::Symbol(description.to_string()))
    }

    /// Create an error object with `name` and `message` data properties
    pub fn make_error(&self, name: &str, message: &str) -> SandboxRef {
        let name = self.make_string(name);
        let message = self.make_string(message);

        let mut data = ObjectData::new(ObjectClass::Error);
        data.properties
            .insert("name".to_string(), Property::Data(name));
        data.properties
            .insert("message".to_string(), Property::Data(message));
        self.alloc(Kind::Object(data))
    }

    /// Make every later property write or delete on `object` throw
    pub fn freeze(&self, object: SandboxRef) {
        if let Some(data) = self.heap.borrow_mut().object_mut(object) {
            data.frozen = true;
        }
    }

    /// Install a property whose get and set throw `error_name: message`
    pub fn define_throwing_property(
        &self,
        object: SandboxRef,
        name: &str,
        error_name: &str,
        message: &str,
    ) {
        if let Some(data) = self.heap.borrow_mut().object_mut(object) {
            data.properties.insert(
                name.to_string(),
                Property::Throwing {
                    error_name: error_name.to_string(),
                    message: message.to_string(),
                },
            );
        }
    }

    /// Free every value not reachable from a pinned value.
    ///
    /// Returns the number of slots reclaimed.
    pub fn collect_garbage(&self) -> usize {
        let mut heap = self.heap.borrow_mut();
        let mut marked = vec![false; heap.slots.len()];

        let mut worklist: Vec<SandboxRef> = vec![
            self.undefined,
            self.null,
            self.true_value,
            self.false_value,
        ];
        for (index, slot) in heap.slots.iter().enumerate() {
            if slot.as_ref().is_some_and(|cell| cell.pins > 0) {
                worklist.push(SandboxRef(index as u32));
            }
        }

        // Mark
        while let Some(r) = worklist.pop() {
            let index = r.0 as usize;
            if marked[index] {
                continue;
            }
            marked[index] = true;

            if let Some(data) = heap.object(r) {
                if let ObjectClass::Boxed(primitive) = data.class {
                    worklist.push(primitive);
                }
                for property in data.properties.values() {
                    if let Property::Data(child) = property {
                        worklist.push(*child);
                    }
                }
            }
        }

        // Sweep
        let mut collected = 0;
        for (index, is_marked) in marked.into_iter().enumerate() {
            if !is_marked && heap.slots[index].is_some() {
                heap.slots[index] = None;
                heap.free.push(index as u32);
                collected += 1;
            }
        }

        let live = heap.slots.len() - heap.free.len();
        debug!(collected, live, "sandbox collection");
        collected
    }

    fn alloc(&self, kind: Kind) -> SandboxRef {
        self.heap.borrow_mut().alloc(kind)
    }

    fn kind(&self, value: SandboxRef) -> Kind {
        match self.heap.borrow().cell(value) {
            Some(cell) => cell.kind.clone(),
            None => {
                warn!(slot = value.0, "use of collected value");
                Kind::Undefined
            }
        }
    }

    fn throw(&self, error_name: &str, message: &str) -> EngineException<SandboxRef> {
        debug!(error_name, message, "sandbox throw");
        EngineException(self.make_error(error_name, message))
    }

    fn type_error(&self, message: &str) -> EngineException<SandboxRef> {
        self.throw("TypeError", message)
    }

    fn primitive_to_string(&self, kind: &Kind) -> Completion<String, SandboxRef> {
        Ok(match kind {
            Kind::Undefined => "undefined".to_string(),
            Kind::Null => "null".to_string(),
            Kind::Boolean(b) => b.to_string(),
            Kind::Number(n) => number_to_string(*n),
            Kind::String(s) => s.clone(),
            Kind::Symbol(_) => {
                return Err(self.type_error("Cannot convert a symbol to a string"));
            }
            Kind::Object(_) => "[object Object]".to_string(),
        })
    }

    fn object_to_string(
        &self,
        object: SandboxRef,
        data: &ObjectData,
        visiting: &mut Vec<SandboxRef>,
    ) -> Completion<String, SandboxRef> {
        match &data.class {
            ObjectClass::Plain => Ok("[object Object]".to_string()),
            ObjectClass::RegExp { source, flags } => Ok(format!("/{source}/{flags}")),
            ObjectClass::Boxed(primitive) => self.to_string_inner(*primitive, visiting),
            ObjectClass::Error => {
                let name = self.data_property_string(data, "name", visiting)?;
                let message = self.data_property_string(data, "message", visiting)?;
                let name = if name.is_empty() { "Error".to_string() } else { name };
                if message.is_empty() {
                    Ok(name)
                } else {
                    Ok(format!("{name}: {message}"))
                }
            }
            ObjectClass::Array => {
                if visiting.contains(&object) {
                    return Ok(String::new());
                }
                visiting.push(object);
                let joined = self.join_array(data, visiting);
                visiting.pop();
                joined
            }
        }
    }

    /// `Array.prototype.join(",")` over the stored elements only.
    ///
    /// Holes cost one separator each and are never visited, so a sparse
    /// array with a huge length joins in time proportional to what it
    /// actually holds. A result longer than [`MAX_STRING_LENGTH`] throws a
    /// `RangeError` before anything is built.
    fn join_array(
        &self,
        data: &ObjectData,
        visiting: &mut Vec<SandboxRef>,
    ) -> Completion<String, SandboxRef> {
        let length = self.array_length(data);
        if length == 0 {
            return Ok(String::new());
        }
        if u64::from(length - 1) > MAX_STRING_LENGTH {
            return Err(self.throw("RangeError", "Out of memory"));
        }

        let mut elements: Vec<(u32, &str)> = data
            .properties
            .keys()
            .filter_map(|key| {
                array_index(key)
                    .filter(|&index| index < length)
                    .map(|index| (index, key.as_str()))
            })
            .collect();
        elements.sort_unstable_by_key(|&(index, _)| index);

        let mut joined = String::new();
        let mut last = 0;
        for (index, key) in elements {
            let part = self.data_property_string(data, key, visiting)?;
            joined.extend(std::iter::repeat_n(',', (index - last) as usize));
            joined.push_str(&part);
            if joined.len() as u64 > MAX_STRING_LENGTH {
                return Err(self.throw("RangeError", "Out of memory"));
            }
            last = index;
        }
        joined.extend(std::iter::repeat_n(',', (length - 1 - last) as usize));
        Ok(joined)
    }

    /// String form of a property for joins: missing, undefined and null
    /// properties all read as empty
    fn data_property_string(
        &self,
        data: &ObjectData,
        name: &str,
        visiting: &mut Vec<SandboxRef>,
    ) -> Completion<String, SandboxRef> {
        match data.properties.get(name) {
            Some(Property::Data(value)) => match self.kind(*value) {
                Kind::Undefined | Kind::Null => Ok(String::new()),
                _ => self.to_string_inner(*value, visiting),
            },
            Some(Property::Throwing {
                error_name,
                message,
            }) => Err(self.throw(error_name, message)),
            None => Ok(String::new()),
        }
    }

    fn to_string_inner(
        &self,
        value: SandboxRef,
        visiting: &mut Vec<SandboxRef>,
    ) -> Completion<String, SandboxRef> {
        match self.kind(value) {
            Kind::Object(data) => self.object_to_string(value, &data, visiting),
            kind => self.primitive_to_string(&kind),
        }
    }

    fn array_length(&self, data: &ObjectData) -> u32 {
        match data.properties.get("length") {
            Some(Property::Data(length)) => self
                .heap
                .borrow()
                .number(*length)
                .map_or(0, |n| n as u32),
            _ => 0,
        }
    }

    /// Properties a boxed string exposes without storing them
    fn virtual_property(&self, object: SandboxRef, name: &str) -> Option<Kind> {
        let primitive = {
            let heap = self.heap.borrow();
            match heap.object(object).map(|data| &data.class) {
                Some(ObjectClass::Boxed(primitive)) => *primitive,
                _ => return None,
            }
        };

        let Kind::String(s) = self.kind(primitive) else {
            return None;
        };
        let units: Vec<u16> = s.encode_utf16().collect();

        if name == "length" {
            return Some(Kind::Number(units.len() as f64));
        }
        let index = array_index(name)? as usize;
        units
            .get(index)
            .map(|unit| Kind::String(String::from_utf16_lossy(&[*unit])))
    }

    fn own_property(&self, object: SandboxRef, name: &str) -> Option<Property> {
        self.heap
            .borrow()
            .object(object)
            .and_then(|data| data.properties.get(name).cloned())
    }
}

impl Default for SandboxEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for SandboxEngine {
    type Value = SandboxRef;
    type Object = SandboxRef;

    fn protect(&self, value: SandboxRef) {
        self.protect_log
            .borrow_mut()
            .push(ProtectEvent::Protect(value));
        match self.heap.borrow_mut().cell_mut(value) {
            Some(cell) => cell.pins += 1,
            None => warn!(slot = value.0, "protect of collected value"),
        }
    }

    fn unprotect(&self, value: SandboxRef) {
        self.protect_log
            .borrow_mut()
            .push(ProtectEvent::Unprotect(value));
        match self.heap.borrow_mut().cell_mut(value) {
            Some(cell) => {
                debug_assert!(cell.pins > 0, "unbalanced unprotect of {value:?}");
                cell.pins = cell.pins.saturating_sub(1);
            }
            None => warn!(slot = value.0, "unprotect of collected value"),
        }
    }

    fn type_of(&self, value: SandboxRef) -> JsType {
        match self.kind(value) {
            Kind::Undefined => JsType::Undefined,
            Kind::Null => JsType::Null,
            Kind::Boolean(_) => JsType::Boolean,
            Kind::Number(_) => JsType::Number,
            Kind::String(_) => JsType::String,
            Kind::Symbol(_) => JsType::Symbol,
            Kind::Object(_) => JsType::Object,
        }
    }

    fn to_boolean(&self, value: SandboxRef) -> bool {
        match self.kind(value) {
            Kind::Undefined | Kind::Null => false,
            Kind::Boolean(b) => b,
            Kind::Number(n) => n != 0.0 && !n.is_nan(),
            Kind::String(s) => !s.is_empty(),
            Kind::Symbol(_) | Kind::Object(_) => true,
        }
    }

    fn to_number(&self, value: SandboxRef) -> Completion<f64, SandboxRef> {
        match self.kind(value) {
            Kind::Undefined => Ok(f64::NAN),
            Kind::Null => Ok(0.0),
            Kind::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
            Kind::Number(n) => Ok(n),
            Kind::String(s) => Ok(string_to_number(&s)),
            Kind::Symbol(_) => Err(self.type_error("Cannot convert a symbol to a number")),
            Kind::Object(data) => match data.class {
                ObjectClass::Boxed(primitive) => self.to_number(primitive),
                _ => {
                    let s = self.object_to_string(value, &data, &mut Vec::new())?;
                    Ok(string_to_number(&s))
                }
            },
        }
    }

    fn to_string_copy(&self, value: SandboxRef) -> Completion<String, SandboxRef> {
        self.to_string_inner(value, &mut Vec::new())
    }

    fn to_object(&self, value: SandboxRef) -> Completion<SandboxRef, SandboxRef> {
        match self.kind(value) {
            Kind::Undefined => Err(self.type_error("undefined is not an object")),
            Kind::Null => Err(self.type_error("null is not an object")),
            Kind::Object(_) => Ok(value),
            _ => Ok(self.alloc(Kind::Object(ObjectData::new(ObjectClass::Boxed(value))))),
        }
    }

    fn object_to_value(&self, object: SandboxRef) -> SandboxRef {
        object
    }

    fn get_property(&self, object: SandboxRef, name: &str) -> Completion<SandboxRef, SandboxRef> {
        match self.own_property(object, name) {
            Some(Property::Data(value)) => Ok(value),
            Some(Property::Throwing {
                error_name,
                message,
            }) => Err(self.throw(&error_name, &message)),
            None => Ok(self
                .virtual_property(object, name)
                .map_or(self.undefined, |kind| self.alloc(kind))),
        }
    }

    fn set_property(
        &self,
        object: SandboxRef,
        name: &str,
        value: SandboxRef,
    ) -> Completion<(), SandboxRef> {
        let (frozen, existing, array_length) = {
            let heap = self.heap.borrow();
            let Some(data) = heap.object(object) else {
                return Ok(());
            };
            let array_length = match data.class {
                ObjectClass::Array => Some(match data.properties.get("length") {
                    Some(Property::Data(length)) => heap.number(*length).unwrap_or(0.0),
                    _ => 0.0,
                }),
                _ => None,
            };
            (data.frozen, data.properties.get(name).cloned(), array_length)
        };

        if frozen {
            return Err(self.type_error(&format!(
                "Attempted to assign to readonly property '{name}'"
            )));
        }
        if let Some(Property::Throwing {
            error_name,
            message,
        }) = existing
        {
            return Err(self.throw(&error_name, &message));
        }

        let mut new_length = None;
        if let (Some(length), Some(index)) = (array_length, array_index(name)) {
            if f64::from(index) >= length {
                new_length = Some(self.make_number(f64::from(index) + 1.0));
            }
        }

        let mut heap = self.heap.borrow_mut();
        if let Some(data) = heap.object_mut(object) {
            data.properties
                .insert(name.to_string(), Property::Data(value));
            if let Some(length) = new_length {
                data.properties
                    .insert("length".to_string(), Property::Data(length));
            }
        }
        Ok(())
    }

    fn delete_property(&self, object: SandboxRef, name: &str) -> Completion<bool, SandboxRef> {
        let (frozen, present) = {
            let heap = self.heap.borrow();
            match heap.object(object) {
                Some(data) => (data.frozen, data.properties.contains_key(name)),
                None => return Ok(true),
            }
        };

        if !present {
            return Ok(true);
        }
        if frozen {
            return Err(self.type_error(&format!("Unable to delete property '{name}'")));
        }

        if let Some(data) = self.heap.borrow_mut().object_mut(object) {
            data.properties.shift_remove(name);
        }
        Ok(true)
    }

    fn has_property(&self, object: SandboxRef, name: &str) -> bool {
        self.own_property(object, name).is_some()
            || self.virtual_property(object, name).is_some()
    }

    fn get_property_at_index(
        &self,
        object: SandboxRef,
        index: u32,
    ) -> Completion<SandboxRef, SandboxRef> {
        self.get_property(object, &index.to_string())
    }

    fn set_property_at_index(
        &self,
        object: SandboxRef,
        index: u32,
        value: SandboxRef,
    ) -> Completion<(), SandboxRef> {
        self.set_property(object, &index.to_string(), value)
    }

    fn make_undefined(&self) -> SandboxRef {
        self.undefined
    }

    fn make_null(&self) -> SandboxRef {
        self.null
    }

    fn make_boolean(&self, value: bool) -> SandboxRef {
        if value {
            self.true_value
        } else {
            self.false_value
        }
    }

    fn make_number(&self, value: f64) -> SandboxRef {
        self.alloc(Kind::Number(value))
    }

    fn make_string(&self, value: &str) -> SandboxRef {
        self.alloc(Kind::String(value.to_string()))
    }

    fn make_object(&self) -> SandboxRef {
        self.alloc(Kind::Object(ObjectData::new(ObjectClass::Plain)))
    }

    fn make_array(&self, elements: &[SandboxRef]) -> Completion<SandboxRef, SandboxRef> {
        let length = self.make_number(elements.len() as f64);

        let mut data = ObjectData::new(ObjectClass::Array);
        for (index, element) in elements.iter().enumerate() {
            data.properties
                .insert(index.to_string(), Property::Data(*element));
        }
        data.properties
            .insert("length".to_string(), Property::Data(length));
        Ok(self.alloc(Kind::Object(data)))
    }

    fn make_regexp(&self, pattern: &str, flags: &str) -> Completion<SandboxRef, SandboxRef> {
        let checked = validate_regexp_flags(flags).and_then(|()| validate_regexp_pattern(pattern));
        if let Err(reason) = checked {
            return Err(self.throw(
                "SyntaxError",
                &format!("Invalid regular expression: /{pattern}/{flags}: {reason}"),
            ));
        }

        let source = if pattern.is_empty() { "(?:)" } else { pattern };
        let source_value = self.make_string(source);
        let flags_value = self.make_string(flags);
        let last_index = self.make_number(0.0);

        let mut data = ObjectData::new(ObjectClass::RegExp {
            source: source.to_string(),
            flags: flags.to_string(),
        });
        data.properties
            .insert("source".to_string(), Property::Data(source_value));
        data.properties
            .insert("flags".to_string(), Property::Data(flags_value));
        data.properties
            .insert("lastIndex".to_string(), Property::Data(last_index));
        Ok(self.alloc(Kind::Object(data)))
    }
}

/// Longest string the sandbox will build, in bytes (JSC's `String::MaxLength`)
const MAX_STRING_LENGTH: u64 = i32::MAX as u64;

/// Parse a canonical array index: decimal digits, no leading zeros,
/// below 2^32 - 1
fn array_index(name: &str) -> Option<u32> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

/// Number::toString for radix 10
fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{n}");
    }

    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

/// StringToNumber: decimal literals, `Infinity`, and 0x/0o/0b integers
fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix_digits = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|digits| (digits, radix)));
    if let Some((digits, radix)) = radix_digits {
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0f64, |acc, c| {
                c.to_digit(radix)
                    .map(|digit| acc * f64::from(radix) + f64::from(digit))
            })
            .unwrap_or(f64::NAN);
    }

    let is_decimal_literal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_decimal_literal {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn validate_regexp_flags(flags: &str) -> Result<(), &'static str> {
    let mut seen = Vec::with_capacity(flags.len());
    for flag in flags.chars() {
        if !"dgimsuvy".contains(flag) || seen.contains(&flag) {
            return Err("invalid flags");
        }
        seen.push(flag);
    }
    if seen.contains(&'u') && seen.contains(&'v') {
        return Err("invalid flags");
    }
    Ok(())
}

/// Structural check only: escapes, character classes, group balance
fn validate_regexp_pattern(pattern: &str) -> Result<(), &'static str> {
    let mut chars = pattern.chars();
    let mut depth = 0usize;
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return Err("\\ at end of pattern");
                }
            }
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '[' => in_class = true,
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err("unmatched parentheses");
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if in_class {
        return Err("missing terminating ] for character class");
    }
    if depth > 0 {
        return Err("missing )");
    }
    Ok(())
}
