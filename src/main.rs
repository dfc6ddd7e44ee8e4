fn main() {
    persona::run_cli();
}
