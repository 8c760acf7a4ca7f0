use lis3mdl::registers::Register;
use lis3mdl::{
    Axis, DataRate, Error, FullScale, Lis3mdl, Lis3mdlConfig, OperatingMode,
    SystemMode, DEFAULT_ADDRESS,
};
use mems_bus::mock::MockBus;

fn chip() -> MockBus {
    // CTRL_REG3 powers up in power-down mode.
    MockBus::new(DEFAULT_ADDRESS)
        .with_sub_auto_increment()
        .with_register(Register::WHO_AM_I.addr(), 0x3D)
        .with_register(Register::CTRL_REG1.addr(), 0x10)
        .with_register(Register::CTRL_REG3.addr(), 0x03)
}

#[futures_test::test]
async fn verify_checks_identity() {
    let mut bus = chip();
    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
    assert_eq!(mag.verify().await, Ok(()));
    drop(mag);

    bus.set_register(Register::WHO_AM_I.addr(), 0x6C);
    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
    assert_eq!(mag.verify().await, Err(Error::InvalidWhoAmI(0x6C)));
}

#[futures_test::test]
async fn configure_writes_reference_mode() {
    let mut bus = chip();
    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
    let fs = mag.configure(&Lis3mdlConfig::default()).await.unwrap();
    drop(mag);

    assert_eq!(fs, FullScale::Fs4Gauss);
    assert_eq!(
        bus.writes(),
        &[
            // OM = high performance, DO kept at 10 Hz, FAST_ODR set.
            (Register::CTRL_REG1.addr(), 0b0101_0010),
            (Register::CTRL_REG4.addr(), 0b0000_1000),
            (Register::CTRL_REG3.addr(), 0b0000_0000),
        ]
    );
}

#[futures_test::test]
async fn configure_preserves_unmanaged_bits() {
    for initial in [0x00u8, 0xFF, 0xA5, 0x5A] {
        let mut bus = chip()
            .with_register(Register::CTRL_REG1.addr(), initial)
            .with_register(Register::CTRL_REG3.addr(), initial)
            .with_register(Register::CTRL_REG4.addr(), initial);
        let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
        mag.configure(&Lis3mdlConfig::default()).await.unwrap();
        drop(mag);

        let ctrl1 = bus.register(Register::CTRL_REG1.addr());
        assert_eq!(ctrl1 & 0b1001_1101, initial & 0b1001_1101);
        let ctrl3 = bus.register(Register::CTRL_REG3.addr());
        assert_eq!(ctrl3, initial & !0b11);
        let ctrl4 = bus.register(Register::CTRL_REG4.addr());
        assert_eq!(ctrl4 & !0b1100, initial & !0b1100);
        assert_eq!(ctrl4 & 0b1100, 0b1000);
    }
}

#[futures_test::test]
async fn configure_is_idempotent() {
    let configs = [
        Lis3mdlConfig::default(),
        Lis3mdlConfig {
            xy_mode: OperatingMode::UltraHighPerformance,
            z_mode: OperatingMode::MediumPerformance,
            fast_odr: false,
            system_mode: SystemMode::Continuous,
            data_rate: Some(DataRate::Odr40Hz),
            full_scale: Some(FullScale::Fs8Gauss),
        },
    ];
    for config in configs {
        let mut bus = chip().with_register(Register::CTRL_REG4.addr(), 0x5A);
        let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
        let first = mag.configure(&config).await.unwrap();
        drop(mag);
        let after_first: Vec<u8> = (0x20..=0x24).map(|r| bus.register(r)).collect();
        let first_writes = bus.writes().to_vec();
        bus.clear_writes();

        let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
        let second = mag.configure(&config).await.unwrap();
        drop(mag);
        let after_second: Vec<u8> = (0x20..=0x24).map(|r| bus.register(r)).collect();

        assert_eq!(first, second);
        assert_eq!(after_first, after_second);
        assert_eq!(bus.writes(), first_writes.as_slice());
    }
}

#[futures_test::test]
async fn explicit_settings_are_programmed() {
    let mut bus = chip();
    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
    let config = Lis3mdlConfig {
        xy_mode: OperatingMode::UltraHighPerformance,
        z_mode: OperatingMode::LowPower,
        fast_odr: false,
        system_mode: SystemMode::Single,
        data_rate: Some(DataRate::Odr80Hz),
        full_scale: Some(FullScale::Fs12Gauss),
    };
    let fs = mag.configure(&config).await.unwrap();
    drop(mag);

    assert_eq!(fs, FullScale::Fs12Gauss);
    assert_eq!(bus.register(Register::CTRL_REG1.addr()), 0b0111_1100);
    assert_eq!(bus.register(Register::CTRL_REG2.addr()), 0b0100_0000);
    assert_eq!(bus.register(Register::CTRL_REG3.addr()), 0b0000_0001);
    assert_eq!(bus.register(Register::CTRL_REG4.addr()), 0b0000_0000);
}

#[futures_test::test]
async fn field_is_divided_by_sensitivity() {
    // FS = 16 gauss.
    let mut bus = chip().with_register(Register::CTRL_REG2.addr(), 0b0110_0000);
    let mut sample = [0u8; 6];
    sample[..2].copy_from_slice(&1711i16.to_le_bytes());
    sample[2..4].copy_from_slice(&(-3422i16).to_le_bytes());
    sample[4..].copy_from_slice(&0i16.to_le_bytes());
    bus.load(Register::OUT_X_L.addr(), &sample);

    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
    assert_eq!(mag.configure(&Lis3mdlConfig::default()).await, Ok(FullScale::Fs16Gauss));

    let field = mag.read_field().await.unwrap();
    assert!((field.x - 1.0).abs() < 1e-6);
    assert!((field.y + 2.0).abs() < 1e-6);
    assert_eq!(field.z, 0.0);

    let y = mag.read_axis(Axis::Y).await.unwrap();
    assert_eq!(y, field.y);
    let z = mag.read_axis(Axis::Z).await.unwrap();
    assert_eq!(z, 0.0);
}

#[futures_test::test]
async fn burst_read_sets_auto_increment() {
    let mut bus = chip();
    bus.load(Register::OUT_X_L.addr(), &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);

    let raw = mag.read_raw().await.unwrap();
    assert_eq!(raw.x, 0x0201);
    assert_eq!(raw.y, 0x0403);
    assert_eq!(raw.z, 0x0605);
}

#[futures_test::test]
async fn reads_before_configure_are_refused() {
    let mut bus = chip();
    let mut mag = Lis3mdl::new(&mut bus, DEFAULT_ADDRESS);
    assert_eq!(mag.read_field().await, Err(Error::NotConfigured));
    assert_eq!(mag.read_axis(Axis::X).await, Err(Error::NotConfigured));
    assert!(mag.read_raw().await.is_ok());
}
