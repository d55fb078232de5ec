//! Textual IR parser.

use crate::core::{
    EnumElementRef, EnumId, Enumeration, EnumerationElement, FunctionId, Interface, InterfaceId,
    ParseError, ParseResult, StructId, Structure, StructureMember, Type, Value,
};
use crate::ir::{
    verify_program, CheckedProgram, Function, Instruction, InstructionSequence, MatchCase,
    MatchCaseKind, RegisterId,
};
use hashbrown::HashMap;
use log::debug;

/// Parses and verifies a program in the textual IR format.
pub fn parse_program(text: &str) -> ParseResult<CheckedProgram> {
    Parser::new(text).parse()
}

/// Stand-in id for `@name` references until all functions are known.
const UNRESOLVED_FUNCTION: FunctionId = FunctionId::MAX;

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    program: CheckedProgram,

    // Global maps
    functions: HashMap<&'a str, FunctionId>,
    enums: HashMap<&'a str, EnumId>,
    structs: HashMap<&'a str, StructId>,
    interfaces: HashMap<&'a str, InterfaceId>,
    /// Per function, the `@name` references in the order literals mention them.
    function_references: Vec<Vec<&'a str>>,

    // Per-function maps
    function_name: &'a str,
    registers: HashMap<&'a str, RegisterId>,
    register_names: Vec<Option<String>>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            program: CheckedProgram::new(),
            functions: HashMap::new(),
            enums: HashMap::new(),
            structs: HashMap::new(),
            interfaces: HashMap::new(),
            function_references: Vec::new(),
            function_name: "",
            registers: HashMap::new(),
            register_names: Vec::new(),
        }
    }

    fn parse(mut self) -> ParseResult<CheckedProgram> {
        loop {
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }
            match self.read_identifier()? {
                "enum" => self.parse_enum()?,
                "struct" => self.parse_struct()?,
                "interface" => self.parse_interface()?,
                "fn" => self.parse_function()?,
                other => {
                    return Err(self.error(format!(
                        "expected enum, struct, interface or fn but found '{other}'"
                    )))
                }
            }
        }

        self.resolve_function_references()?;
        verify_program(&self.program)?;
        debug!(
            "parsed {} functions, {} enums, {} structs, {} interfaces",
            self.program.functions.len(),
            self.program.enums.len(),
            self.program.structs.len(),
            self.program.interfaces.len()
        );
        Ok(self.program)
    }

    // -------- lexing ---------

    fn error(&self, reason: impl Into<String>) -> ParseError {
        let before = &self.text[..self.pos];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        ParseError::Syntax {
            line,
            column: before[line_start..].chars().count() + 1,
            reason: reason.into(),
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ';' {
                // Comment until end of line
                while let Some(ch) = self.advance() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn try_read(&mut self, ch: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn try_read_str(&mut self, text: &str) -> bool {
        self.skip_whitespace();
        if self.text[self.pos..].starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> ParseResult<()> {
        if !self.try_read(ch) {
            return Err(self.unexpected(&format!("'{ch}'")));
        }
        Ok(())
    }

    fn expect_str(&mut self, text: &str) -> ParseResult<()> {
        if !self.try_read_str(text) {
            return Err(self.unexpected(&format!("'{text}'")));
        }
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(found) => self.error(format!("expected {expected} but found '{found}'")),
            None => self.error(format!("expected {expected} but reached the end of input")),
        }
    }

    /// Reads `[A-Za-z0-9_]+` at the current position.
    fn read_word(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        &text[start..self.pos]
    }

    fn read_identifier(&mut self) -> ParseResult<&'a str> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => Ok(self.read_word()),
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Consumes `keyword` if the next identifier is exactly it.
    fn try_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let rest = &self.text[self.pos..];
        let is_keyword = rest.starts_with(keyword)
            && !rest[keyword.len()..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if is_keyword {
            self.pos += keyword.len();
        }
        is_keyword
    }

    fn read_number(&mut self) -> ParseResult<u64> {
        self.skip_whitespace();
        let text = self.text;
        let rest = &text[self.pos..];
        let (digits, radix) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
            Some(hex) => {
                let length = hex.chars().take_while(char::is_ascii_hexdigit).count();
                self.pos += 2;
                (&hex[..length], 16)
            }
            None => {
                let length = rest.chars().take_while(char::is_ascii_digit).count();
                (&rest[..length], 10)
            }
        };
        if digits.is_empty() {
            return Err(self.unexpected("number"));
        }
        let number = u64::from_str_radix(digits, radix)
            .map_err(|e| self.error(format!("invalid number '{digits}': {e}")))?;
        self.pos += digits.len();
        Ok(number)
    }

    fn read_u32(&mut self) -> ParseResult<u32> {
        let number = self.read_number()?;
        u32::try_from(number).map_err(|_| self.error(format!("{number} does not fit in 32 bits")))
    }

    fn read_string(&mut self) -> ParseResult<String> {
        self.expect('"')?;
        let mut string = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(string),
                Some('\\') => match self.advance() {
                    Some('n') => string.push('\n'),
                    Some('r') => string.push('\r'),
                    Some('t') => string.push('\t'),
                    Some('"') => string.push('"'),
                    Some('\\') => string.push('\\'),
                    Some('u') => {
                        self.expect('{')?;
                        let start = self.pos;
                        while self.peek().is_some_and(|ch| ch.is_ascii_hexdigit()) {
                            self.advance();
                        }
                        let text = self.text;
                        let digits = &text[start..self.pos];
                        let ch = u32::from_str_radix(digits, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| self.error(format!("invalid escape \\u{{{digits}}}")))?;
                        self.expect('}')?;
                        string.push(ch);
                    }
                    Some(other) => return Err(self.error(format!("unknown escape \\{other}"))),
                    None => return Err(self.error("unterminated string")),
                },
                Some(ch) => string.push(ch),
            }
        }
    }

    /// Reads `%name` or `%number` and returns the name.
    fn read_register_name(&mut self) -> ParseResult<&'a str> {
        self.expect('%')?;
        let name = self.read_word();
        if name.is_empty() {
            return Err(self.unexpected("register name"));
        }
        Ok(name)
    }

    // -------- names ---------

    fn define_register(&mut self, name: &'a str) -> ParseResult<RegisterId> {
        if self.registers.contains_key(name) {
            return Err(ParseError::DuplicateRegister {
                function: self.function_name.to_string(),
                name: name.to_string(),
            });
        }
        let id = RegisterId::new(self.register_names.len() as u32);
        self.registers.insert(name, id);
        let is_number = name.chars().all(|ch| ch.is_ascii_digit());
        self.register_names
            .push((!is_number).then(|| name.to_string()));
        Ok(id)
    }

    fn lookup_register(&self, name: &str) -> ParseResult<RegisterId> {
        self.registers
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UndefinedRegister {
                function: self.function_name.to_string(),
                name: name.to_string(),
            })
    }

    fn read_register(&mut self) -> ParseResult<RegisterId> {
        let name = self.read_register_name()?;
        self.lookup_register(name)
    }

    fn parse_register_list(&mut self) -> ParseResult<Vec<RegisterId>> {
        self.expect('(')?;
        let mut registers = Vec::new();
        if self.try_read(')') {
            return Ok(registers);
        }
        loop {
            registers.push(self.read_register()?);
            if self.try_read(')') {
                return Ok(registers);
            }
            self.expect(',')?;
        }
    }

    fn lookup_enum(&self, name: &str) -> ParseResult<EnumId> {
        self.enums
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UndefinedType {
                kind: "enum",
                name: name.to_string(),
            })
    }

    fn resolve_element(&self, enum_name: &str, element_name: &str) -> ParseResult<EnumElementRef> {
        let enumeration = self.lookup_enum(enum_name)?;
        let which = self.program.enums[enumeration as usize]
            .find_element(element_name)
            .ok_or_else(|| ParseError::UndefinedEnumElement {
                enumeration: enum_name.to_string(),
                element: element_name.to_string(),
            })?;
        Ok(EnumElementRef::new(enumeration, which))
    }

    /// Reads `Enum.element`.
    fn parse_element_ref(&mut self) -> ParseResult<EnumElementRef> {
        let enum_name = self.read_identifier()?;
        self.expect('.')?;
        let element_name = self.read_identifier()?;
        self.resolve_element(enum_name, element_name)
    }

    fn resolve_function_references(&mut self) -> ParseResult<()> {
        let references = std::mem::take(&mut self.function_references);
        let functions = &self.functions;
        for (function, names) in self.program.functions.iter_mut().zip(references) {
            let mut names = names.into_iter();
            let mut undefined = None;
            function.body.for_each_function_mut(&mut |id| {
                if let Some(name) = names.next() {
                    match functions.get(name) {
                        Some(&resolved) => *id = resolved,
                        None => {
                            undefined.get_or_insert(name);
                        }
                    }
                }
            });
            if let Some(name) = undefined {
                return Err(ParseError::UndefinedFunction {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    // -------- declarations ---------

    fn parse_enum(&mut self) -> ParseResult<()> {
        let name = self.read_identifier()?;
        if self.enums.contains_key(name) {
            return Err(ParseError::DuplicateType {
                kind: "enum",
                name: name.to_string(),
            });
        }

        self.expect('{')?;
        let mut elements: Vec<EnumerationElement> = Vec::new();
        while !self.try_read('}') {
            let element = self.read_identifier()?;
            if elements.iter().any(|existing| existing.name == element) {
                return Err(self.error(format!("duplicate element {element} in enum {name}")));
            }
            let state = if self.try_read('(') {
                let state = self.parse_type()?;
                self.expect(')')?;
                Some(state)
            } else {
                None
            };
            elements.push(EnumerationElement {
                name: element.to_string(),
                state,
            });
            if !self.try_read(',') {
                self.expect('}')?;
                break;
            }
        }

        // Registered only now, so an enum cannot name itself as a payload.
        let id = self.program.enums.len() as EnumId;
        self.program.enums.push(Enumeration::new(name, elements));
        self.enums.insert(name, id);
        Ok(())
    }

    fn parse_struct(&mut self) -> ParseResult<()> {
        let name = self.read_identifier()?;
        if self.structs.contains_key(name) {
            return Err(ParseError::DuplicateType {
                kind: "struct",
                name: name.to_string(),
            });
        }

        self.expect('{')?;
        let mut members = Vec::new();
        while !self.try_read('}') {
            let member = self.read_identifier()?;
            self.expect(':')?;
            let what = self.parse_type()?;
            members.push(StructureMember {
                name: member.to_string(),
                what,
            });
            if !self.try_read(',') {
                self.expect('}')?;
                break;
            }
        }

        let id = self.program.structs.len() as StructId;
        self.program.structs.push(Structure {
            name: name.to_string(),
            members,
        });
        self.structs.insert(name, id);
        Ok(())
    }

    fn parse_interface(&mut self) -> ParseResult<()> {
        let name = self.read_identifier()?;
        if self.interfaces.contains_key(name) {
            return Err(ParseError::DuplicateType {
                kind: "interface",
                name: name.to_string(),
            });
        }
        let id = self.program.interfaces.len() as InterfaceId;
        self.program.interfaces.push(Interface {
            name: name.to_string(),
        });
        self.interfaces.insert(name, id);
        Ok(())
    }

    fn parse_type(&mut self) -> ParseResult<Type> {
        let keyword = self.read_identifier()?;
        let type_ = match keyword {
            "unit" => Type::Unit,
            "string" => Type::String,
            "host" => Type::HostValue,
            "int" => {
                let minimum = self.read_number()?;
                self.expect_str("..")?;
                let maximum = self.read_number()?;
                if minimum > maximum {
                    return Err(self.error(format!("empty integer range {minimum}..{maximum}")));
                }
                Type::integer(minimum, maximum)
            }
            "enum" => {
                let name = self.read_identifier()?;
                Type::Enumeration(self.lookup_enum(name)?)
            }
            "struct" => {
                let name = self.read_identifier()?;
                let id = self.structs.get(name).copied().ok_or_else(|| {
                    ParseError::UndefinedType {
                        kind: "struct",
                        name: name.to_string(),
                    }
                })?;
                Type::Structure(id)
            }
            "interface" => {
                let name = self.read_identifier()?;
                let id = self.interfaces.get(name).copied().ok_or_else(|| {
                    ParseError::UndefinedType {
                        kind: "interface",
                        name: name.to_string(),
                    }
                })?;
                Type::Interface(id)
            }
            "constructor" => Type::EnumConstructor(self.parse_element_ref()?),
            "function" => {
                let parameters = self.parse_type_list()?;
                self.expect_str("->")?;
                let result = self.parse_type()?;
                Type::FunctionPointer {
                    parameters,
                    result: Box::new(result),
                }
            }
            "tuple" => Type::Tuple(self.parse_type_list()?),
            other => return Err(self.error(format!("unknown type '{other}'"))),
        };
        Ok(type_)
    }

    fn parse_type_list(&mut self) -> ParseResult<Vec<Type>> {
        self.expect('(')?;
        let mut types = Vec::new();
        if self.try_read(')') {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if self.try_read(')') {
                return Ok(types);
            }
            self.expect(',')?;
        }
    }

    fn parse_value(&mut self) -> ParseResult<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') => Ok(Value::String(self.read_string()?)),
            Some('@') => {
                self.advance();
                let name = self.read_word();
                if name.is_empty() {
                    return Err(self.unexpected("function name"));
                }
                if let Some(references) = self.function_references.last_mut() {
                    references.push(name);
                }
                Ok(Value::FunctionPointer(UNRESOLVED_FUNCTION))
            }
            Some('(') => {
                self.advance();
                let mut elements = Vec::new();
                if self.try_read(')') {
                    return Ok(Value::Tuple(elements));
                }
                loop {
                    elements.push(self.parse_value()?);
                    if self.try_read(')') {
                        return Ok(Value::Tuple(elements));
                    }
                    self.expect(',')?;
                }
            }
            Some(ch) if ch.is_ascii_digit() => Ok(Value::Integer(self.read_number()?)),
            _ => match self.read_identifier()? {
                "unit" => Ok(Value::Unit),
                "constructor" => Ok(Value::EnumConstructor(self.parse_element_ref()?)),
                enum_name => {
                    self.expect('.')?;
                    let element_name = self.read_identifier()?;
                    let element = self.resolve_element(enum_name, element_name)?;
                    let state = if self.try_read('(') {
                        let state = self.parse_value()?;
                        self.expect(')')?;
                        Some(Box::new(state))
                    } else {
                        None
                    };
                    Ok(Value::EnumElement { element, state })
                }
            },
        }
    }

    // -------- functions ---------

    fn parse_function(&mut self) -> ParseResult<()> {
        let name = self.read_identifier()?;
        if self.functions.contains_key(name) {
            return Err(ParseError::DuplicateFunction {
                name: name.to_string(),
            });
        }
        let id = self.program.functions.len() as FunctionId;
        self.functions.insert(name, id);

        // Reset per-function state
        self.function_name = name;
        self.registers.clear();
        self.register_names.clear();
        self.function_references.push(Vec::new());

        self.expect('(')?;
        let mut parameter_count = 0;
        if !self.try_read(')') {
            loop {
                let parameter = self.read_register_name()?;
                self.define_register(parameter)?;
                parameter_count += 1;
                if self.try_read(')') {
                    break;
                }
                self.expect(',')?;
            }
        }

        self.expect_str("->")?;
        let return_name = self.read_register_name()?;
        self.expect('{')?;
        let body = self.parse_sequence()?;
        let return_value = self.lookup_register(return_name)?;

        let register_names = std::mem::take(&mut self.register_names);
        self.program.functions.push(Function {
            name: name.to_string(),
            parameter_count,
            return_value,
            number_of_registers: register_names.len() as u32,
            register_names,
            body,
        });
        Ok(())
    }

    /// Parses instructions up to and including the closing `}`.
    fn parse_sequence(&mut self) -> ParseResult<InstructionSequence> {
        let mut sequence = InstructionSequence::new();
        loop {
            if self.try_read('}') {
                return Ok(sequence);
            }
            if self.is_eof() {
                return Err(self.unexpected("'}'"));
            }
            sequence.push(self.parse_instruction()?);
        }
    }

    fn parse_instruction(&mut self) -> ParseResult<Instruction> {
        self.skip_whitespace();
        if self.peek() != Some('%') {
            return match self.read_identifier()? {
                "loop" => {
                    self.expect('{')?;
                    Ok(Instruction::Loop(self.parse_sequence()?))
                }
                "break" => Ok(Instruction::Break),
                other => Err(self.error(format!("unknown instruction '{other}'"))),
            };
        }

        let name = self.read_register_name()?;
        let result = self.define_register(name)?;
        self.expect('=')?;
        let instruction = match self.read_identifier()? {
            "call" => {
                let callee = self.read_register()?;
                let arguments = self.parse_register_list()?;
                Instruction::call(callee, arguments, result)
            }
            "literal" => {
                let value = self.parse_value()?;
                self.expect(':')?;
                let type_of = self.parse_type()?;
                Instruction::literal(result, value, type_of)
            }
            "tuple" => Instruction::tuple(self.parse_register_list()?, result),
            "read_struct" => {
                let from_object = self.read_register()?;
                self.expect('.')?;
                let member = self.read_u32()?;
                Instruction::read_struct(from_object, member, result)
            }
            "enum_construct" => {
                let which = self.parse_element_ref()?;
                self.expect('(')?;
                let state = self.read_register()?;
                self.expect(')')?;
                // Stateless elements are reported by the verifier.
                let state_type = self.program.enums[which.enumeration as usize].elements
                    [which.which as usize]
                    .state
                    .clone()
                    .unwrap_or(Type::Unit);
                Instruction::enum_construct(result, which, state, state_type)
            }
            "global" => Instruction::Global(result),
            "match" => self.parse_match(result)?,
            other => return Err(self.error(format!("unknown instruction '{other}'"))),
        };
        Ok(instruction)
    }

    fn parse_match(&mut self, result: RegisterId) -> ParseResult<Instruction> {
        let key = self.read_register()?;
        self.expect('{')?;
        let mut cases = Vec::new();
        while !self.try_read('}') {
            if !self.try_keyword("case") {
                return Err(self.unexpected("'case'"));
            }
            self.skip_whitespace();
            let kind = if self.peek() == Some('%') {
                MatchCaseKind::Value(self.read_register()?)
            } else {
                let element = self.parse_element_ref()?;
                self.expect('(')?;
                let name = self.read_register_name()?;
                let state_into = self.define_register(name)?;
                self.expect(')')?;
                MatchCaseKind::StatefulEnum {
                    element,
                    state_into,
                }
            };
            self.expect('{')?;
            let action = self.parse_sequence()?;
            let value = if self.try_keyword("yield") {
                Some(self.read_register()?)
            } else {
                None
            };
            cases.push(MatchCase {
                kind,
                action,
                value,
            });
        }
        Ok(Instruction::match_(key, cases, result))
    }
}
