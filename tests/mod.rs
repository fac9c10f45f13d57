mod helpers;

#[test]
fn fixtures_are_present_and_readable() {
    let basic = helpers::read_fixture("history_basic.csv");
    let green = helpers::read_fixture("history_all_green.csv");

    assert!(basic.starts_with(b"test,team,status,branch"));
    assert!(green.starts_with(b"test,team,status,branch"));
    assert_ne!(basic, green);
}
