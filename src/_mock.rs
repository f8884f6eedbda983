//! Simulated controller behind mock pins, data lines and delay.

extern crate std;

use core::cell::RefCell;
use core::convert::Infallible;
use std::{collections::VecDeque, rc::Rc, vec, vec::Vec};

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::{
    interface::{BusTiming, DataBus, Direction, ParallelInterface},
    models::ILI9341,
    Builder, Display,
};

pub const WIDTH: u16 = 240;
pub const HEIGHT: u16 = 320;

/// One latched or sampled bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strobe {
    Command(u8),
    Data(u8),
    Read(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

struct State {
    frame: Vec<u16>,
    columns: (u16, u16),
    rows: (u16, u16),
    cursor: (u16, u16),
    read_cursor: (u16, u16),
    command: Option<u8>,
    params: Vec<u8>,
    high_byte: Option<u8>,
    read_queue: VecDeque<u8>,
    reading: bool,
    bus_value: u8,
    direction: Direction,
    dc_high: bool,
    wr_low: bool,
    rd_low_at: Option<u64>,
    elapsed_ns: u64,
    min_settle_ns: Option<u64>,
    fail_reads: bool,
    resets: usize,
    bus_writes: usize,
    strobes: Vec<Strobe>,
    written: Vec<(u16, u16)>,
}

impl State {
    fn new() -> Self {
        Self {
            frame: vec![0; WIDTH as usize * HEIGHT as usize],
            columns: (0, WIDTH - 1),
            rows: (0, HEIGHT - 1),
            cursor: (0, 0),
            read_cursor: (0, 0),
            command: None,
            params: Vec::new(),
            high_byte: None,
            read_queue: VecDeque::new(),
            reading: false,
            bus_value: 0,
            direction: Direction::Output,
            dc_high: true,
            wr_low: false,
            rd_low_at: None,
            elapsed_ns: 0,
            min_settle_ns: None,
            fail_reads: false,
            resets: 0,
            bus_writes: 0,
            strobes: Vec::new(),
            written: Vec::new(),
        }
    }

    fn latch(&mut self) {
        assert_eq!(
            self.direction,
            Direction::Output,
            "write strobe while the data lines are inputs"
        );
        let value = self.bus_value;
        if self.dc_high {
            self.strobes.push(Strobe::Data(value));
            self.data(value);
        } else {
            self.strobes.push(Strobe::Command(value));
            self.command(value);
        }
    }

    fn command(&mut self, command: u8) {
        self.command = Some(command);
        self.params.clear();
        self.high_byte = None;
        self.reading = false;
        match command {
            0x2C => self.cursor = (self.columns.0, self.rows.0),
            0x2E => {
                self.read_cursor = (self.columns.0, self.rows.0);
                self.start_read();
            }
            0x3E => self.start_read(),
            _ => {}
        }
    }

    fn start_read(&mut self) {
        self.reading = true;
        self.read_queue.clear();
        // dummy cycle
        self.read_queue.push_back(0x00);
    }

    fn data(&mut self, value: u8) {
        match self.command {
            Some(0x2A) => {
                self.params.push(value);
                match self.params.len() {
                    2 => self.columns.0 = u16::from_be_bytes([self.params[0], self.params[1]]),
                    4 => self.columns.1 = u16::from_be_bytes([self.params[2], self.params[3]]),
                    _ => {}
                }
            }
            Some(0x2B) => {
                self.params.push(value);
                match self.params.len() {
                    2 => self.rows.0 = u16::from_be_bytes([self.params[0], self.params[1]]),
                    4 => self.rows.1 = u16::from_be_bytes([self.params[2], self.params[3]]),
                    _ => {}
                }
            }
            Some(0x2C) => match self.high_byte.take() {
                None => self.high_byte = Some(value),
                Some(high) => {
                    let (x, y) = self.cursor;
                    self.store(x, y, u16::from_be_bytes([high, value]));
                    self.written.push((x, y));
                    self.cursor = self.advance(self.cursor);
                }
            },
            _ => self.params.push(value),
        }
    }

    fn advance(&self, (mut x, mut y): (u16, u16)) -> (u16, u16) {
        x += 1;
        if x > self.columns.1 {
            x = self.columns.0;
            y += 1;
            if y > self.rows.1 {
                y = self.rows.0;
            }
        }
        (x, y)
    }

    fn store(&mut self, x: u16, y: u16, value: u16) {
        if x < WIDTH && y < HEIGHT {
            self.frame[y as usize * WIDTH as usize + x as usize] = value;
        }
    }

    fn load(&self, x: u16, y: u16) -> u16 {
        if x < WIDTH && y < HEIGHT {
            self.frame[y as usize * WIDTH as usize + x as usize]
        } else {
            0
        }
    }

    fn next_read_byte(&mut self) -> u8 {
        if !self.reading {
            return 0;
        }
        if self.read_queue.is_empty() {
            let (x, y) = self.read_cursor;
            let value = self.load(x, y);
            // 18-bit memory: channels widened to 6 bits, left-aligned in each byte
            let r5 = (value >> 11) as u8 & 0x1F;
            let g6 = (value >> 5) as u8 & 0x3F;
            let b5 = value as u8 & 0x1F;
            let r6 = (r5 << 1) | (r5 >> 4);
            let b6 = (b5 << 1) | (b5 >> 4);
            self.read_queue.extend([r6 << 2, g6 << 2, b6 << 2]);
            self.read_cursor = self.advance(self.read_cursor);
        }
        self.read_queue.pop_front().unwrap_or(0)
    }
}

/// Shared handle on the simulated controller.
#[derive(Clone)]
pub struct Controller(Rc<RefCell<State>>);

pub type MockInterface = ParallelInterface<MockBus, MockPin, MockPin, MockPin, MockDelay>;
pub type MockDisplay = Display<MockInterface, ILI9341, MockPin>;

impl Controller {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(State::new())))
    }

    pub fn interface(&self, timing: BusTiming) -> MockInterface {
        ParallelInterface::new(
            MockBus(self.0.clone()),
            self.pin(Line::Dc),
            self.pin(Line::Wr),
            self.pin(Line::Rd),
            self.delay(),
            timing,
        )
    }

    pub fn pin(&self, line: Line) -> MockPin {
        MockPin {
            state: self.0.clone(),
            line,
        }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay(self.0.clone())
    }

    pub fn strobes(&self) -> Vec<Strobe> {
        self.0.borrow().strobes.clone()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.0
            .borrow()
            .strobes
            .iter()
            .filter_map(|s| match s {
                Strobe::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Number of write strobes.
    pub fn transactions(&self) -> usize {
        self.0
            .borrow()
            .strobes
            .iter()
            .filter(|s| !matches!(s, Strobe::Read(_)))
            .count()
    }

    /// Number of times a new value was driven onto the data lines.
    pub fn bus_writes(&self) -> usize {
        self.0.borrow().bus_writes
    }

    /// Pixels written since the last [`Self::clear_log`], in write order.
    pub fn written(&self) -> Vec<(u16, u16)> {
        self.0.borrow().written.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.0.borrow_mut();
        state.strobes.clear();
        state.written.clear();
        state.bus_writes = 0;
        state.min_settle_ns = None;
    }

    pub fn pixel(&self, x: u16, y: u16) -> u16 {
        self.0.borrow().load(x, y)
    }

    pub fn set_pixel(&self, x: u16, y: u16, value: u16) {
        self.0.borrow_mut().store(x, y, value);
    }

    pub fn direction(&self) -> Direction {
        self.0.borrow().direction
    }

    pub fn min_settle_ns(&self) -> Option<u64> {
        self.0.borrow().min_settle_ns
    }

    pub fn fail_reads(&self, fail: bool) {
        self.0.borrow_mut().fail_reads = fail;
    }

    pub fn resets(&self) -> usize {
        self.0.borrow().resets
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.0.borrow().elapsed_ns
    }
}

/// Initialized ILI9341 display on a fresh controller, with the init traffic cleared.
pub fn new_mock_display() -> (MockDisplay, Controller) {
    let controller = Controller::new();
    let di = controller.interface(BusTiming::reference());
    let mut delay = controller.delay();
    let display = tokio_test::block_on(
        Builder::new(ILI9341, di)
            .reset_pin(controller.pin(Line::Rst))
            .init(&mut delay),
    )
    .unwrap();
    controller.clear_log();
    (display, controller)
}

pub struct MockBus(Rc<RefCell<State>>);

impl DataBus for MockBus {
    type Error = MockError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.bus_value = byte;
        state.bus_writes += 1;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut state = self.0.borrow_mut();
        assert_eq!(
            state.direction,
            Direction::Input,
            "sampling the data lines in output mode"
        );
        if state.fail_reads {
            return Err(MockError);
        }
        let Some(low_at) = state.rd_low_at else {
            return Ok(0);
        };
        let settle = state.elapsed_ns - low_at;
        state.min_settle_ns = Some(state.min_settle_ns.map_or(settle, |m| m.min(settle)));
        let value = if settle < u64::from(BusTiming::READ_SETTLE_NS) {
            0xFF
        } else {
            state.bus_value
        };
        state.strobes.push(Strobe::Read(value));
        Ok(value)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.0.borrow_mut().direction = direction;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Dc,
    Wr,
    Rd,
    Rst,
}

pub struct MockPin {
    state: Rc<RefCell<State>>,
    line: Line,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        match self.line {
            Line::Dc => state.dc_high = false,
            Line::Wr => state.wr_low = true,
            Line::Rd => {
                assert_eq!(
                    state.direction,
                    Direction::Input,
                    "read strobe while the data lines are outputs"
                );
                let value = state.next_read_byte();
                state.bus_value = value;
                state.rd_low_at = Some(state.elapsed_ns);
            }
            Line::Rst => state.resets += 1,
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        match self.line {
            Line::Dc => state.dc_high = true,
            Line::Wr => {
                if state.wr_low {
                    state.wr_low = false;
                    state.latch();
                }
            }
            Line::Rd => state.rd_low_at = None,
            Line::Rst => {}
        }
        Ok(())
    }
}

pub struct MockDelay(Rc<RefCell<State>>);

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().elapsed_ns += u64::from(ns);
    }
}

impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().elapsed_ns += u64::from(ns);
    }
}
