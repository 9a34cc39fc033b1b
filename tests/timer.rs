use dotmatrix::timer::Timer;

#[test]
fn div_increments_every_256_cycles() {
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.step(256, &mut if_reg);
    assert_eq!(t.read(0xFF04), 1);
    t.step(255, &mut if_reg);
    assert_eq!(t.read(0xFF04), 1);
    t.step(1, &mut if_reg);
    assert_eq!(t.read(0xFF04), 2);
    assert_eq!(if_reg, 0);
}

#[test]
fn div_resets_on_any_write() {
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.div = 0xABCD;
    t.write(0xFF04, 0x12, &mut if_reg);
    assert_eq!(t.read(0xFF04), 0);
    assert_eq!(t.div, 0);
}

#[test]
fn div_reset_falling_edge_ticks_tima() {
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.div = 0x0200; // selected bit (9) high
    t.write(0xFF07, 0x04, &mut if_reg); // enable, 4096 Hz
    t.write(0xFF04, 0, &mut if_reg);
    assert_eq!(t.tima, 1);
    assert_eq!(if_reg, 0);
}

#[test]
fn tac_disable_falling_edge_ticks_tima() {
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.div = 0x0200;
    t.write(0xFF07, 0x04, &mut if_reg);
    t.write(0xFF07, 0x00, &mut if_reg);
    assert_eq!(t.tima, 1);
}

#[test]
fn tima_rates_follow_tac() {
    // 262144 Hz: one increment every 16 cycles.
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.write(0xFF07, 0x05, &mut if_reg);
    t.step(16, &mut if_reg);
    assert_eq!(t.tima, 1);
    t.step(16 * 9, &mut if_reg);
    assert_eq!(t.tima, 10);

    // 4096 Hz: one increment every 1024 cycles.
    let mut t = Timer::new();
    t.write(0xFF07, 0x04, &mut if_reg);
    t.step(1024, &mut if_reg);
    assert_eq!(t.tima, 1);
}

#[test]
fn residual_cycles_are_not_dropped() {
    // Odd-sized steps that never divide the period still accumulate.
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.write(0xFF07, 0x05, &mut if_reg); // period 16
    for _ in 0..16 {
        t.step(12, &mut if_reg);
    }
    // 192 cycles = 12 periods.
    assert_eq!(t.tima, 12);
}

#[test]
fn overflow_reloads_tma_and_requests_interrupt() {
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.write(0xFF07, 0x04, &mut if_reg);
    t.tima = 0xFF;
    t.tma = 0xAB;
    t.step(1024, &mut if_reg);
    assert_eq!(t.tima, 0xAB);
    assert_eq!(if_reg & 0x04, 0x04);
}

#[test]
fn tac_reads_with_high_bits_set() {
    let mut t = Timer::new();
    let mut if_reg = 0u8;
    t.write(0xFF07, 0x05, &mut if_reg);
    assert_eq!(t.read(0xFF07), 0xFD);
}
