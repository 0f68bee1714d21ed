fn main() {
    breathdot_lib::run()
}
