use embassy_time::Duration;
use embedded_hal_async::i2c::{ErrorKind, NoAcknowledgeSource};
use mems_bus::mock::MockBus;
use mems_bus::{field, with_field, Error, Register, RegisterInterface, Timeout};

const ADDR: u8 = 0x6A;

// ---------------------------------------------------------------------------
// A register with a two-bit field at bits 5..=6 and everything else reserved
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mode(u8);

impl Mode {
    const MODE: u8 = 0b0110_0000;

    fn mode(self) -> u8 {
        field(self.0, Self::MODE)
    }

    fn with_mode(self, mode: u8) -> Self {
        Self(with_field(self.0, Self::MODE, mode))
    }
}

impl Register for Mode {
    const ADDRESS: u8 = 0x20;

    fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    fn to_byte(self) -> u8 {
        self.0
    }
}

#[futures_test::test]
async fn read_register_issues_write_then_read() {
    let mut bus = MockBus::new(ADDR).with_register(0x0F, 0x6C);
    let mut regs = RegisterInterface::new(&mut bus, ADDR);

    assert_eq!(regs.read_register(0x0F).await, Ok(0x6C));
    drop(regs);

    assert_eq!(bus.transactions(), 1);
    assert!(bus.writes().is_empty());
}

#[futures_test::test]
async fn write_register_sends_address_and_value() {
    let mut bus = MockBus::new(ADDR);
    let mut regs = RegisterInterface::new(&mut bus, ADDR);

    regs.write_register(0x10, 0x12).await.unwrap();
    drop(regs);

    assert_eq!(bus.writes(), &[(0x10, 0x12)]);
    assert_eq!(bus.register(0x10), 0x12);
}

#[futures_test::test]
async fn burst_read_follows_auto_increment() {
    let mut bus = MockBus::new(ADDR);
    bus.load(0x28, &[1, 2, 3, 4, 5, 6]);
    let mut regs = RegisterInterface::new(&mut bus, ADDR);

    let mut buf = [0u8; 6];
    regs.read_registers(0x28, &mut buf).await.unwrap();
    assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
}

#[futures_test::test]
async fn burst_read_without_sub_msb_repeats_one_register() {
    let mut bus = MockBus::new(0x1E).with_sub_auto_increment();
    bus.load(0x28, &[1, 2, 3, 4, 5, 6]);
    let mut regs = RegisterInterface::new(&mut bus, 0x1E);

    let mut buf = [0u8; 6];
    regs.read_registers(0x28, &mut buf).await.unwrap();
    assert_eq!(buf, [1; 6]);

    regs.read_registers(0x28 | 0x80, &mut buf).await.unwrap();
    assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
}

#[futures_test::test]
async fn modify_preserves_untouched_bits() {
    for initial in 0..=u8::MAX {
        let mut bus = MockBus::new(ADDR).with_register(Mode::ADDRESS, initial);
        let mut regs = RegisterInterface::new(&mut bus, ADDR);

        let written = regs.modify(|r: Mode| r.with_mode(0b10)).await.unwrap();
        drop(regs);

        assert_eq!(written.mode(), 0b10);
        let after = bus.register(Mode::ADDRESS);
        assert_eq!(after & !Mode::MODE, initial & !Mode::MODE);
        assert_eq!(after, written.to_byte());
    }
}

#[futures_test::test]
async fn nack_surfaces_as_bus_error() {
    let mut bus = MockBus::new(ADDR);
    bus.nack_next(1);
    let mut regs = RegisterInterface::new(&mut bus, ADDR);

    let result = regs.read_register(0x0F).await;
    assert_eq!(
        result,
        Err(Error::I2c(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)))
    );

    // The next attempt goes through.
    assert!(regs.read_register(0x0F).await.is_ok());
}

#[futures_test::test]
async fn wrong_address_is_refused() {
    let mut bus = MockBus::new(0x1E);
    let mut regs = RegisterInterface::new(&mut bus, ADDR);

    assert!(matches!(regs.read_register(0x0F).await, Err(Error::I2c(_))));
}

#[futures_test::test]
async fn hung_bus_times_out() {
    let mut bus = MockBus::new(ADDR);
    bus.hang(true);
    let mut regs = RegisterInterface::new(&mut bus, ADDR)
        .with_timeout(Timeout::After(Duration::from_millis(5)));

    assert_eq!(regs.write_register(0x10, 0).await, Err(Error::Timeout));
}
