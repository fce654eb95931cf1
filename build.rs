fn main() {
    // ESP-IDF link arguments only matter for the firmware binary; host
    // test builds skip them.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
