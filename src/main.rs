fn main() {
    tether::term::main()
}
