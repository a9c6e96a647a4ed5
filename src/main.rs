fn main() {
    sable_bin::main();
}
